//! Configuration management

use anyhow::{Context, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MOVIE_API_URL: &str = "https://api.skymansion.site/movies-dl";
const DEFAULT_DISPLAY_NAME: &str = "Gemma 3 Telegram";

/// Bot configuration, built once at startup and handed to each component
#[derive(Clone)]
pub struct Config {
    /// Telegram bot token
    pub telegram_token: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini model name (e.g. gemini-2.0-flash)
    pub gemini_model: String,

    /// Gemini REST base URL
    pub gemini_api_url: String,

    /// Movie metadata API base URL
    pub movie_api_url: String,

    /// Movie metadata API key, sent as the `apikey` query parameter
    pub movie_api_key: String,

    /// Name shown in the /start greeting
    pub display_name: String,

    /// Optional credit line for the /start greeting
    pub owner: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} must be set", key))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            telegram_token: required("TELEGRAM_BOT_TOKEN")?,
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: optional("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_api_url: optional("GEMINI_API_URL", DEFAULT_GEMINI_API_URL)
                .trim_end_matches('/')
                .to_string(),
            movie_api_url: optional("MOVIE_API_URL", DEFAULT_MOVIE_API_URL)
                .trim_end_matches('/')
                .to_string(),
            movie_api_key: required("MOVIE_API_KEY")?,
            display_name: optional("BOT_DISPLAY_NAME", DEFAULT_DISPLAY_NAME),
            owner: lookup("BOT_OWNER")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_url", &self.gemini_api_url)
            .field("movie_api_url", &self.movie_api_url)
            .field("movie_api_key", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let env = vars(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("GEMINI_API_KEY", "g-key"),
            ("MOVIE_API_KEY", "m-key"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.movie_api_url, DEFAULT_MOVIE_API_URL);
        assert_eq!(config.display_name, "Gemma 3 Telegram");
        assert!(config.owner.is_none());
    }

    #[test]
    fn test_missing_required_names_variable() {
        let env = vars(&[("TELEGRAM_BOT_TOKEN", "123:abc"), ("GEMINI_API_KEY", "g-key")]);
        let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("MOVIE_API_KEY"));
    }

    #[test]
    fn test_blank_required_is_missing() {
        let env = vars(&[
            ("TELEGRAM_BOT_TOKEN", "   "),
            ("GEMINI_API_KEY", "g-key"),
            ("MOVIE_API_KEY", "m-key"),
        ]);
        assert!(Config::from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let env = vars(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("GEMINI_API_KEY", "g-key"),
            ("MOVIE_API_KEY", "m-key"),
            ("MOVIE_API_URL", "http://localhost:8080/api/"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.movie_api_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let env = vars(&[
            ("TELEGRAM_BOT_TOKEN", "123:secret-token"),
            ("GEMINI_API_KEY", "g-secret"),
            ("MOVIE_API_KEY", "m-secret"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"));
    }
}
