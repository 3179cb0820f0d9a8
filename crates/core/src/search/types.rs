//! Types for the multi-indexer torrent search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel seed value marking fallback search-link entries.
pub const SEEDS_UNKNOWN: &str = "N/A";

/// A single search result row, either a genuine torrent listing or a
/// fallback search link (seeds == "N/A").
///
/// Seeds and size stay display strings: indexers report them in wildly
/// different formats ("1.4 GB", "1 337", "N/A") and the UI shows them
/// verbatim. Ranking parses seeds leniently via [`seed_count`].
///
/// [`seed_count`]: CandidateResult::seed_count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Listing title.
    pub name: String,
    /// Primary link: magnet, detail page, or raw search URL for fallbacks.
    pub url: String,
    /// Display size ("1.4 GB", "N/A").
    pub size: String,
    /// Detected quality tag ("1080p", "Unknown", "N/A" for fallbacks).
    pub quality: String,
    /// Display seed count; "N/A" marks fallback entries.
    pub seeds: String,
    /// Display leech count.
    pub leechers: String,
    /// Source name ("Rutor", "1337x", "Google", ...).
    pub engine: String,
    /// Magnet URI when the listing row carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    /// Direct .torrent URL when the listing row carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_url: Option<String>,
}

impl CandidateResult {
    /// Numeric seed count for ranking. Non-numeric values rank as 0.
    pub fn seed_count(&self) -> u64 {
        self.seeds.trim().parse().unwrap_or(0)
    }

    /// Whether this entry is a fallback search link rather than a
    /// genuine listing.
    pub fn is_search_link(&self) -> bool {
        self.seeds == SEEDS_UNKNOWN
    }
}

/// Errors from a single indexer.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Indexer returned an error: {0}")]
    ApiError(String),

    #[error("Failed to parse indexer response: {0}")]
    Parse(String),

    #[error("Request timeout")]
    Timeout,
}

impl SearchError {
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::ConnectionFailed(e.to_string())
        } else {
            SearchError::ApiError(e.to_string())
        }
    }
}

/// A single torrent source.
///
/// `search` receives the full prioritized query list; each adapter
/// decides how many variants it tries. Implementations must contain
/// their own failures per query and only surface an error when nothing
/// was retrievable at all.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Source name used in results and logs.
    fn name(&self) -> &str;

    /// Search with the prioritized query variants.
    async fn search(
        &self,
        queries: &[String],
        year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, SearchError>;
}
