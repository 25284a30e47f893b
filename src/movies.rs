//! Movie metadata client
//!
//! Read-only wrapper around the movie/TV metadata API. Three GET endpoints
//! share one envelope, `{"result": {"data": ...}}`; an absent or empty
//! `data` means "not found" and is kept distinct from transport failures.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BotError;

/// Subtitle-language annotations stripped from titles before display.
/// Longest phrases first so a shorter one never splits a longer match.
pub const SUBTITLE_ANNOTATIONS: &[&str] = &[
    "Sinhala Subtitles | සිංහල උපසිරැසි සමඟ",
    "Sinhala Subtitle | සිංහල උපසිරැසි සමඟ",
    "| සිංහල උපසිරැසි සමඟ",
    "සිංහල උපසිරැසි සමඟ",
];

/// Remove every known subtitle annotation; all other bytes are left as-is
pub fn clean_title(title: &str) -> String {
    SUBTITLE_ANNOTATIONS
        .iter()
        .fold(title.to_string(), |acc, phrase| acc.replace(phrase, ""))
}

/// Movie or series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Classify from the API `type` field, falling back to the link shape
    fn classify(kind: Option<&str>, link: &str) -> Self {
        let kind = kind.unwrap_or("").to_lowercase();
        if kind.contains("tv") || kind.contains("series") || kind.contains("show") {
            Self::Series
        } else if kind.is_empty() && link.contains("/tvshows/") {
            Self::Series
        } else {
            Self::Movie
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::Series => "TV Series",
        }
    }
}

/// One row of a search result list
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultItem {
    pub title: String,
    pub kind: MediaKind,
    pub link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieDetail {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "releaseDate", alias = "release_date")]
    pub date: String,
    #[serde(default, alias = "duration")]
    pub runtime: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, alias = "imdbRate", alias = "imdb_rate")]
    pub rating: String,
    #[serde(default, deserialize_with = "cast_names")]
    pub cast: Vec<String>,
    #[serde(default, alias = "overview")]
    pub description: String,
    #[serde(default, alias = "poster", alias = "imageUrl")]
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesDetail {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "firstAirDate", alias = "first_air_date")]
    pub date: String,
    #[serde(default, alias = "genres")]
    pub category: String,
    #[serde(default)]
    pub episodes: Vec<EpisodeItem>,
    #[serde(default, alias = "poster", alias = "imageUrl")]
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodeItem {
    #[serde(default, alias = "episode", deserialize_with = "number_text")]
    pub number: String,
    #[serde(default, alias = "title")]
    pub name: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Deserialize)]
struct RawSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    link: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<EnvelopeResult>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResult {
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Accept cast as `["Name"]` or `[{"name": "Name", ...}]`
fn cast_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CastEntry {
        Name(String),
        Person {
            #[serde(alias = "actor")]
            name: String,
        },
    }

    let entries = Option::<Vec<CastEntry>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .map(|e| match e {
            CastEntry::Name(n) | CastEntry::Person { name: n } => n,
        })
        .collect())
}

/// Episode numbers come back as numbers or strings
fn number_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn is_empty_payload(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Read-only movie/TV lookups
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, BotError>;
    async fn fetch_movie_detail(&self, link: &str) -> Result<MovieDetail, BotError>;
    async fn fetch_series_detail(&self, link: &str) -> Result<SeriesDetail, BotError>;
}

/// HTTP client for the metadata API
#[derive(Clone)]
pub struct MovieClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MovieClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create from config
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.movie_api_url, &config.movie_api_key)
    }

    /// GET `{base}{path}` and unwrap `result.data`
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        param: (&str, &str),
    ) -> Result<T, BotError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Movie API request: path={}, {}={}", path, param.0, param.1);

        let response = self
            .client
            .get(&url)
            .query(&[param, ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| BotError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Transport(format!("Movie API {} returned {}", path, status)));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| {
                BotError::Transport(format!("Invalid Movie API response: {}", e.without_url()))
            })?;

        let data = envelope
            .result
            .and_then(|r| r.data)
            .filter(|d| !is_empty_payload(d))
            .ok_or(BotError::NotFound)?;

        serde_json::from_value(data).map_err(|e| {
            warn!("Movie API {} payload did not match: {}", path, e);
            BotError::Transport(format!("Unexpected Movie API payload: {}", e))
        })
    }
}

#[async_trait]
impl MovieCatalog for MovieClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, BotError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BotError::NotFound);
        }

        let raw: Vec<RawSearchItem> = self.fetch("/search", ("text", query)).await?;
        let items: Vec<SearchResultItem> = raw
            .into_iter()
            .filter(|r| !r.link.is_empty())
            .map(|r| SearchResultItem {
                kind: MediaKind::classify(r.kind.as_deref(), &r.link),
                title: r.title,
                link: r.link,
            })
            .collect();

        if items.is_empty() {
            return Err(BotError::NotFound);
        }
        debug!("Search {:?}: {} results", query, items.len());
        Ok(items)
    }

    async fn fetch_movie_detail(&self, link: &str) -> Result<MovieDetail, BotError> {
        self.fetch("/movie", ("url", link)).await
    }

    async fn fetch_series_detail(&self, link: &str) -> Result<SeriesDetail, BotError> {
        self.fetch("/tvshow", ("url", link)).await
    }
}
