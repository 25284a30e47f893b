//! Error taxonomy and the fixed user-facing messages it maps to.
//!
//! Underlying errors are logged where they occur. Users only ever see
//! [`NOT_FOUND_MESSAGE`] or [`GENERIC_ERROR_MESSAGE`].

/// Shown when a search or detail lookup returns no data
pub const NOT_FOUND_MESSAGE: &str = "❌ Nothing found. Try a different title.";

/// Shown for every other failure
pub const GENERIC_ERROR_MESSAGE: &str = "⚠️ Sorry, I encountered an error. Please try again.";

/// Error types for event handling
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Nothing found")]
    NotFound,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Malformed callback: {0}")]
    MalformedCallback(String),
}

impl BotError {
    /// Fixed text shown to the user for this error
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound => NOT_FOUND_MESSAGE,
            Self::Transport(_) | Self::Upstream(_) | Self::MalformedCallback(_) => {
                GENERIC_ERROR_MESSAGE
            }
        }
    }
}
