//! Upstream event source.
//!
//! The sampler only needs one thing from the outside world: a list of recent
//! items matching a keyword, each carrying a creation timestamp. [`EventSource`]
//! is that seam; [`twitter::TwitterClient`] is the production implementation.

pub mod twitter;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use twitter::{TwitterClient, TwitterConfig};

/// Timestamp layout used by the search API, e.g. `Wed Aug 27 13:08:45 +0000 2008`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Maximum number of items requested per sample.
pub const MAX_ITEMS: u32 = 100;

/// Freshness hint passed to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Recent,
    Popular,
    Mixed,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Recent => "recent",
            ResultType::Popular => "popular",
            ResultType::Mixed => "mixed",
        }
    }
}

/// A single search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub result_type: ResultType,
    pub count: u32,
}

impl SearchQuery {
    /// Query for the most recent items matching `keyword`.
    pub fn recent(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            result_type: ResultType::Recent,
            count: MAX_ITEMS,
        }
    }
}

/// One item returned by the source. Only the creation time is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    #[serde(default)]
    pub id_str: Option<String>,
    pub created_at: String,
}

impl SourceItem {
    pub fn new(created_at: impl Into<String>) -> Self {
        Self {
            id_str: None,
            created_at: created_at.into(),
        }
    }

    /// Build an item from a timestamp, formatted the way the API sends it.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self::new(timestamp.format(CREATED_AT_FORMAT).to_string())
    }

    /// Parse the item's creation time.
    pub fn timestamp(&self) -> Result<DateTime<Utc>, TimestampParseError> {
        DateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| TimestampParseError {
                value: self.created_at.clone(),
                reason: e.to_string(),
            })
    }
}

/// An item's timestamp could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParseError {
    pub value: String,
    pub reason: String,
}

impl std::fmt::Display for TimestampParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid timestamp '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for TimestampParseError {}

/// The source call itself failed.
#[derive(Debug)]
pub enum SourceError {
    /// Token exchange failed or credentials were rejected
    Auth(String),
    /// Network/HTTP error
    Network(String),
    /// Server returned an error response
    Server { status: u16, message: String },
    /// Response body could not be decoded
    Decode(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Auth(msg) => write!(f, "Source auth error: {msg}"),
            SourceError::Network(msg) => write!(f, "Source network error: {msg}"),
            SourceError::Server { status, message } => {
                write!(f, "Source server error ({status}): {message}")
            }
            SourceError::Decode(msg) => write!(f, "Source decode error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Anything that can answer a keyword search with timestamped items.
///
/// Items are expected newest-first.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SourceItem>, SourceError>;
}
