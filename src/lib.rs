//! moviebot
//!
//! Telegram bot that chats through Gemini and browses movies and TV series
//! through a metadata API with inline buttons.
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► telegram (teloxide) ──► dispatcher ──┬── /start /help /stats /movies
//!                                                   │     └── metrics (sysinfo)
//!                                                   ├── movie intent / buttons
//!                                                   │     └── navigation ──► movies (HTTP)
//!                                                   └── anything else
//!                                                         └── gemini (HTTP)
//! ```
//!
//! Nothing is persisted. Navigation state travels in button payloads.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod movies;
pub mod navigation;
pub mod telegram;
pub mod telegram_ui;


pub use config::Config;
pub use dispatcher::{route, Command, Handlers, Route};
pub use error::{BotError, GENERIC_ERROR_MESSAGE, NOT_FOUND_MESSAGE};
pub use gemini::{AiRelay, GeminiClient, TextGenerator};
pub use metrics::SystemMonitor;
pub use movies::{
    clean_title, EpisodeItem, MediaKind, MovieCatalog, MovieClient, MovieDetail, SearchResultItem,
    SeriesDetail,
};
pub use navigation::{NavigationAction, Navigator, PayloadError};
pub use telegram_ui::Reply;
