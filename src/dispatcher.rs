//! Inbound event routing
//!
//! Free text is routed by fixed precedence, first match wins:
//! 1. `/command`
//! 2. movie-intent prefix (`movie`, `film`, `tv show`, `season`, `episode`, `download`)
//! 3. anything else except a bare URL goes to the AI relay
//!
//! Button presses always go to the navigation flow.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::gemini::{AiRelay, GeminiClient};
use crate::metrics::SystemMonitor;
use crate::movies::MovieClient;
use crate::navigation::Navigator;
use crate::telegram_ui::{html_escape, Reply};

/// Keyword prefixes that mark a message as a movie/TV search
pub const MOVIE_INTENT_KEYWORDS: &[&str] =
    &["movie", "film", "tv show", "season", "episode", "download"];

// Keyword, rest of its word, separators, then the query
static RE_MOVIE_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^(?:movie|film|tv show|season|episode|download)\w*[\s:\-]*(.*)$").unwrap()
});

static RE_BARE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?://|www\.)\S+$").unwrap()
});

/// Bot commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Stats,
    Movies,
    Unknown(String),
}

impl Command {
    /// Parse `/cmd[@botname] [args]`
    pub fn parse(text: &str) -> Self {
        let first = text.split_whitespace().next().unwrap_or("");
        let name = first
            .trim_start_matches('/')
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "stats" => Self::Stats,
            "movies" => Self::Movies,
            _ => Self::Unknown(name),
        }
    }
}

/// Where a free-text message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Command(Command),
    MovieSearch(String),
    AiRelay(String),
    Ignore,
}

/// Classify a free-text message
pub fn route(text: &str) -> Route {
    let trimmed = text.trim();

    if trimmed.starts_with('/') {
        return Route::Command(Command::parse(trimmed));
    }

    if let Some(caps) = RE_MOVIE_INTENT.captures(trimmed) {
        let query = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        return Route::MovieSearch(query.to_string());
    }

    if trimmed.is_empty() || RE_BARE_URL.is_match(trimmed) {
        return Route::Ignore;
    }

    Route::AiRelay(text.to_string())
}

/// Stateless handlers behind the router
#[derive(Clone)]
pub struct Handlers {
    relay: AiRelay,
    navigator: Navigator,
    monitor: SystemMonitor,
    display_name: String,
    owner: Option<String>,
}

impl Handlers {
    pub fn new(
        config: &Config,
        relay: AiRelay,
        navigator: Navigator,
        monitor: SystemMonitor,
    ) -> Self {
        Self {
            relay,
            navigator,
            monitor,
            display_name: config.display_name.clone(),
            owner: config.owner.clone(),
        }
    }

    /// Wire up the real Gemini and metadata clients
    pub fn from_config(config: &Config, monitor: SystemMonitor) -> Self {
        let relay = AiRelay::new(Arc::new(GeminiClient::from_config(config)));
        let navigator = Navigator::new(Arc::new(MovieClient::from_config(config)));
        Self::new(config, relay, navigator, monitor)
    }

    /// Route and handle one text message. `None` means stay silent.
    pub async fn handle_text(&self, text: &str, sender: Option<&str>) -> Option<Reply> {
        self.dispatch(route(text), sender).await
    }

    /// Handle an already-routed message
    pub async fn dispatch(&self, route: Route, sender: Option<&str>) -> Option<Reply> {
        match route {
            Route::Command(cmd) => Some(self.handle_command(&cmd, sender)),
            Route::MovieSearch(query) => Some(self.navigator.search(&query).await),
            Route::AiRelay(text) => Some(Reply::plain(self.relay.relay(&text).await)),
            Route::Ignore => {
                debug!("Ignoring message with no handler");
                None
            }
        }
    }

    /// Handle a button press
    pub async fn handle_callback(&self, data: &str) -> Reply {
        self.navigator.handle_callback(data).await
    }

    pub fn handle_command(&self, command: &Command, sender: Option<&str>) -> Reply {
        match command {
            Command::Start => Reply::html(self.welcome_text(sender)),
            Command::Help => Reply::html(HELP_TEXT),
            Command::Stats => Reply::html(self.stats_text()),
            Command::Movies => Reply::html(MOVIES_HELP_TEXT),
            Command::Unknown(name) => {
                debug!("Unknown command: /{}", name);
                Reply::plain("Unknown command. Type /help to see what I can do.")
            }
        }
    }

    fn welcome_text(&self, sender: Option<&str>) -> String {
        let name = sender.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("there");
        let owner = self
            .owner
            .as_deref()
            .map(|o| format!("🧸 <b>{}</b>\n", html_escape(o)))
            .unwrap_or_default();

        format!(
            "Hello, 👋 <b>{}</b>. ♥️\n\n\
            👏 Welcome to <b>{}</b>\n\n\
            •──────────────────────────•\n\
            {}\n\
            🧠 <b>{}</b>\n\
            {}\
            •──────────────────────────•\n\n\
            Do you have any questions? Send a message or type /help.",
            html_escape(name),
            html_escape(&self.display_name),
            self.monitor.stats_report(),
            html_escape(&self.display_name),
            owner
        )
    }

    fn stats_text(&self) -> String {
        format!("🖥 <b>System Status</b>:\n\n{}", self.monitor.stats_report())
    }
}

const HELP_TEXT: &str = "🔍 <b>Help Menu</b>:\n\n\
    • Just send me a message to chat with the AI\n\
    • Start a message with <i>movie</i>, <i>film</i>, <i>tv show</i>, <i>season</i>, \
    <i>episode</i> or <i>download</i> to search movies and TV series\n\
    • /start - Show welcome message\n\
    • /help - This menu\n\
    • /stats - Show system status\n\
    • /movies - Movie search help\n\n\
    📝 <b>Examples</b>:\n\
    • \"Explain quantum computing\"\n\
    • \"Write a poem about AI\"\n\
    • \"movie Inception\"";

const MOVIES_HELP_TEXT: &str = "🎬 <b>Movie &amp; TV Search</b>:\n\n\
    Start your message with one of these words followed by a title:\n\
    • <code>movie Inception</code>\n\
    • <code>film The Matrix</code>\n\
    • <code>tv show Breaking Bad</code>\n\
    • <code>season Lost</code>\n\
    • <code>episode Friends</code>\n\
    • <code>download Interstellar</code>\n\n\
    Tap a result to see its details. For series, tap an episode to pick it.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/HELP"), Command::Help);
        assert_eq!(Command::parse("/stats@MovieBot"), Command::Stats);
        assert_eq!(Command::parse("/movies now please"), Command::Movies);
        assert_eq!(Command::parse("/nope"), Command::Unknown("nope".into()));
    }

    #[test]
    fn test_commands_take_precedence() {
        assert_eq!(route("/movie Inception"), Route::Command(Command::Unknown("movie".into())));
        assert_eq!(route("/start"), Route::Command(Command::Start));
    }

    #[test]
    fn test_movie_intent_extracts_query() {
        let cases = [
            ("movie Inception", "Inception"),
            ("Movie: The Matrix", "The Matrix"),
            ("FILM - Dune", "Dune"),
            ("tv show Breaking Bad", "Breaking Bad"),
            ("TV Shows Lost", "Lost"),
            ("season Friends", "Friends"),
            ("episodes of Dark", "of Dark"),
            ("download Interstellar 2014", "Interstellar 2014"),
            ("movies", ""),
        ];
        for (text, query) in cases {
            assert_eq!(route(text), Route::MovieSearch(query.into()), "text: {}", text);
        }
    }

    #[test]
    fn test_every_keyword_is_matched() {
        for keyword in MOVIE_INTENT_KEYWORDS {
            assert!(matches!(route(&format!("{} x", keyword)), Route::MovieSearch(_)));
        }
    }

    #[test]
    fn test_plain_text_goes_to_relay() {
        let texts = ["Explain quantum computing", "what is a movie?", "tv is great", "  hello  "];
        for text in texts {
            assert_eq!(route(text), Route::AiRelay(text.to_string()));
        }
    }

    #[test]
    fn test_bare_url_ignored() {
        assert_eq!(route("https://example.com/watch?v=1"), Route::Ignore);
        assert_eq!(route("www.example.com"), Route::Ignore);
        assert!(matches!(route("check https://example.com"), Route::AiRelay(_)));
        assert_eq!(route("   "), Route::Ignore);
    }
}
