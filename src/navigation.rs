//! Movie/TV navigation flow
//!
//! Search → result list → movie or series detail → episode / download.
//! No state is kept between steps: each button carries a [`NavigationAction`]
//! encoded as `<verb>_<link>`, and pressing it performs exactly one remote
//! fetch before rendering the next step.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::BotError;
use crate::movies::{
    clean_title, MediaKind, MovieCatalog, MovieDetail, SearchResultItem, SeriesDetail,
};
use crate::telegram_ui::{
    column_keyboard, html_escape, join_lines_bounded, row_keyboard, truncate_chars, Reply,
    MAX_CAPTION_CHARS, MAX_TEXT_CHARS,
};

/// Telegram rejects callback data longer than this
pub const MAX_PAYLOAD_BYTES: usize = 64;

/// Telegram caps inline keyboards at 100 buttons
const MAX_EPISODE_BUTTONS: usize = 100;

/// Cast names shown in a photo caption
const CAPTION_CAST_LIMIT: usize = 5;

/// Titles and queries are cut to this many chars before escaping
const MAX_TITLE_CHARS: usize = 200;

/// Reply for the episode and download steps, which have no backend yet
pub const NOT_SUPPORTED_MESSAGE: &str = "⏳ Downloads are not supported yet. Stay tuned!";

const SEPARATOR: char = '_';

/// Button payload decode/encode failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("payload has no verb separator")]
    MissingSeparator,

    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    #[error("payload target is empty")]
    EmptyTarget,

    #[error("payload is {0} bytes, limit is {max}", max = MAX_PAYLOAD_BYTES)]
    TooLong(usize),
}

impl From<PayloadError> for BotError {
    fn from(e: PayloadError) -> Self {
        BotError::MalformedCallback(e.to_string())
    }
}

/// A button press: which step comes next, and for which remote item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    SelectMovie(String),
    SelectSeries(String),
    SelectEpisode(String),
    Download(String),
    Details(String),
}

impl NavigationAction {
    /// Wire tag. None of these contain the separator.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::SelectMovie(_) => "movie",
            Self::SelectSeries(_) => "tv",
            Self::SelectEpisode(_) => "ep",
            Self::Download(_) => "dl",
            Self::Details(_) => "details",
        }
    }

    /// Opaque remote link, exactly as the API returned it
    pub fn target(&self) -> &str {
        match self {
            Self::SelectMovie(t)
            | Self::SelectSeries(t)
            | Self::SelectEpisode(t)
            | Self::Download(t)
            | Self::Details(t) => t,
        }
    }

    /// Select action for a search result
    pub fn select(item: &SearchResultItem) -> Self {
        match item.kind {
            MediaKind::Movie => Self::SelectMovie(item.link.clone()),
            MediaKind::Series => Self::SelectSeries(item.link.clone()),
        }
    }

    /// Encode as callback data
    pub fn encode(&self) -> Result<String, PayloadError> {
        if self.target().is_empty() {
            return Err(PayloadError::EmptyTarget);
        }
        let payload = format!("{}{}{}", self.verb(), SEPARATOR, self.target());
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(PayloadError::TooLong(payload.len()));
        }
        Ok(payload)
    }

    /// Decode callback data.
    ///
    /// Splits at the first separator; verbs never contain one, so links
    /// that do survive unchanged.
    pub fn decode(data: &str) -> Result<Self, PayloadError> {
        let (verb, target) = data
            .split_once(SEPARATOR)
            .ok_or(PayloadError::MissingSeparator)?;
        if target.is_empty() {
            return Err(PayloadError::EmptyTarget);
        }

        let target = target.to_string();
        match verb {
            "movie" => Ok(Self::SelectMovie(target)),
            "tv" => Ok(Self::SelectSeries(target)),
            "ep" => Ok(Self::SelectEpisode(target)),
            "dl" => Ok(Self::Download(target)),
            "details" => Ok(Self::Details(target)),
            other => Err(PayloadError::UnknownVerb(other.to_string())),
        }
    }
}

/// Drives the search → detail flow against a metadata catalog
#[derive(Clone)]
pub struct Navigator {
    catalog: Arc<dyn MovieCatalog>,
}

impl Navigator {
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { catalog }
    }

    /// Idle → ResultsShown
    pub async fn search(&self, query: &str) -> Reply {
        match self.catalog.search(query).await {
            Ok(items) if items.is_empty() => failure_reply("search", query, BotError::NotFound),
            Ok(items) => render_results(query, &items),
            Err(e) => failure_reply("search", query, e),
        }
    }

    /// Decode a button payload and run the step it names.
    /// Malformed payloads fail closed with the generic error.
    pub async fn handle_callback(&self, data: &str) -> Reply {
        match NavigationAction::decode(data) {
            Ok(action) => self.handle_action(action).await,
            Err(e) => failure_reply("callback", data, e.into()),
        }
    }

    pub async fn handle_action(&self, action: NavigationAction) -> Reply {
        info!("Navigation: verb={}, target={}", action.verb(), action.target());

        match action {
            NavigationAction::SelectMovie(link) => {
                match self.catalog.fetch_movie_detail(&link).await {
                    Ok(detail) => render_movie(&detail, &link),
                    Err(e) => failure_reply("movie detail", &link, e),
                }
            }
            NavigationAction::Details(link) => {
                match self.catalog.fetch_movie_detail(&link).await {
                    Ok(detail) => render_movie_details(&detail, &link),
                    Err(e) => failure_reply("movie details", &link, e),
                }
            }
            NavigationAction::SelectSeries(link) => {
                match self.catalog.fetch_series_detail(&link).await {
                    Ok(detail) => render_series(&detail),
                    Err(e) => failure_reply("series detail", &link, e),
                }
            }
            NavigationAction::SelectEpisode(link) | NavigationAction::Download(link) => {
                info!("Download requested but not supported: {}", link);
                Reply::plain(NOT_SUPPORTED_MESSAGE)
            }
        }
    }
}

fn failure_reply(step: &str, subject: &str, e: BotError) -> Reply {
    match &e {
        BotError::NotFound => info!("{}: nothing found for {:?}", step, subject),
        _ => error!("{} failed for {:?}: {}", step, subject, e),
    }
    Reply::plain(e.user_message())
}

/// Encode an action for a button, skipping it if it cannot fit
fn button(label: String, action: NavigationAction) -> Option<(String, String)> {
    match action.encode() {
        Ok(payload) => Some((label, payload)),
        Err(e) => {
            warn!("Dropping button {:?}: {}", label, e);
            None
        }
    }
}

/// Escaped, length-bounded display text
fn display_text(raw: &str) -> String {
    html_escape(&truncate_chars(raw.trim(), MAX_TITLE_CHARS))
}

/// Numbered result list, one select button per item, in API order
pub fn render_results(query: &str, items: &[SearchResultItem]) -> Reply {
    let mut lines = vec![
        format!("🔎 <b>Results for</b> <i>{}</i>", display_text(query)),
        String::new(),
    ];
    let mut buttons = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let n = i + 1;
        let title = clean_title(&item.title);
        let icon = match item.kind {
            MediaKind::Movie => "🎬",
            MediaKind::Series => "📺",
        };
        lines.push(format!(
            "{}. {} {} <i>({})</i>",
            n,
            icon,
            display_text(&title),
            item.kind.label()
        ));
        buttons.extend(button(
            format!("{}. {}", n, title.trim()),
            NavigationAction::select(item),
        ));
    }
    lines.push(String::new());
    lines.push("Tap a result to see details.".to_string());

    Reply::html(join_lines_bounded(&lines, MAX_TEXT_CHARS))
        .with_keyboard(column_keyboard(buttons))
}

fn field_line(icon: &str, label: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(format!("{} <b>{}:</b> {}", icon, label, html_escape(value)))
    }
}

fn movie_fields(detail: &MovieDetail) -> Vec<String> {
    [
        field_line("📅", "Released", &detail.date),
        field_line("⏱", "Runtime", &detail.runtime),
        field_line("🌍", "Country", &detail.country),
        field_line("⭐", "IMDb", &detail.rating),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Photo (or text, without a poster) carrying the given lines and keyboard
fn with_poster(image: &str, lines: &[String], buttons: Vec<(String, String)>, row: bool) -> Reply {
    let keyboard = if row { row_keyboard(buttons) } else { column_keyboard(buttons) };
    if image.trim().is_empty() {
        Reply::html(join_lines_bounded(lines, MAX_TEXT_CHARS)).with_keyboard(keyboard)
    } else {
        Reply::photo(image.trim(), join_lines_bounded(lines, MAX_CAPTION_CHARS))
            .with_keyboard(keyboard)
    }
}

/// Movie detail card with download and details buttons
pub fn render_movie(detail: &MovieDetail, link: &str) -> Reply {
    let mut lines = vec![
        format!("🎬 <b>{}</b>", display_text(&clean_title(&detail.title))),
        String::new(),
    ];
    lines.extend(movie_fields(detail));
    if !detail.cast.is_empty() {
        let cast: Vec<&str> = detail
            .cast
            .iter()
            .take(CAPTION_CAST_LIMIT)
            .map(String::as_str)
            .collect();
        lines.push(format!("🎭 <b>Cast:</b> {}", html_escape(&cast.join(", "))));
    }

    let buttons = [
        button("⬇️ Download".to_string(), NavigationAction::Download(link.to_string())),
        button("ℹ️ Details".to_string(), NavigationAction::Details(link.to_string())),
    ]
    .into_iter()
    .flatten()
    .collect();

    with_poster(&detail.image, &lines, buttons, true)
}

/// Long-form movie text: every field, full cast, description
pub fn render_movie_details(detail: &MovieDetail, link: &str) -> Reply {
    let mut lines = vec![
        format!("🎬 <b>{}</b>", display_text(&clean_title(&detail.title))),
        String::new(),
    ];
    lines.extend(movie_fields(detail));
    if !detail.cast.is_empty() {
        lines.push(String::new());
        lines.push("🎭 <b>Cast</b>".to_string());
        lines.extend(detail.cast.iter().map(|name| format!("• {}", html_escape(name))));
    }
    if !detail.description.trim().is_empty() {
        lines.push(String::new());
        lines.push(html_escape(&truncate_chars(detail.description.trim(), MAX_TEXT_CHARS / 2)));
    }

    let buttons = button("⬇️ Download".to_string(), NavigationAction::Download(link.to_string()))
        .into_iter()
        .collect();
    Reply::html(join_lines_bounded(&lines, MAX_TEXT_CHARS)).with_keyboard(row_keyboard(buttons))
}

/// Series card with one button per episode
pub fn render_series(detail: &SeriesDetail) -> Reply {
    let mut lines = vec![
        format!("📺 <b>{}</b>", display_text(&clean_title(&detail.title))),
        String::new(),
    ];
    lines.extend(
        [
            field_line("📅", "First aired", &detail.date),
            field_line("🏷", "Category", &detail.category),
        ]
        .into_iter()
        .flatten(),
    );

    if detail.episodes.is_empty() {
        lines.push("No episodes listed yet.".to_string());
    } else {
        lines.push(format!("🎞 <b>Episodes:</b> {}", detail.episodes.len()));
    }

    if detail.episodes.len() > MAX_EPISODE_BUTTONS {
        warn!(
            "Series {:?} has {} episodes, showing first {}",
            detail.title,
            detail.episodes.len(),
            MAX_EPISODE_BUTTONS
        );
    }
    let buttons = detail
        .episodes
        .iter()
        .take(MAX_EPISODE_BUTTONS)
        .filter_map(|ep| {
            let label = match (ep.number.trim(), ep.name.trim()) {
                ("", name) => name.to_string(),
                (number, "") => format!("Episode {}", number),
                (number, name) => format!("{} · {}", number, name),
            };
            button(label, NavigationAction::SelectEpisode(ep.link.clone()))
        })
        .collect();

    with_poster(&detail.image, &lines, buttons, false)
}
