//! Indexer adapters, one per torrent source.
//!
//! Each adapter builds a search URL, fetches with the configured
//! timeout, and hands the body to a synchronous parse helper. Parsing
//! stays off the async path because `scraper::Html` is not `Send`; the
//! returned futures must be, since they run inside the HTTP server.

mod eztv;
mod kinozal;
mod rutor;
mod rutracker;
mod x1337;
mod yts;

pub use eztv::EztvIndexer;
pub use kinozal::KinozalIndexer;
pub use rutor::RutorIndexer;
pub use rutracker::RutrackerIndexer;
pub use x1337::X1337Indexer;
pub use yts::YtsIndexer;

use std::sync::Arc;
use std::time::Duration;

use crate::config::SearchConfig;

use super::Indexer;

/// Browser user agent; several trackers reject the reqwest default.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
}

pub(crate) fn selector(css: &str) -> Result<scraper::Selector, super::SearchError> {
    scraper::Selector::parse(css).map_err(|e| super::SearchError::Parse(e.to_string()))
}

pub(crate) fn element_text(el: scraper::ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Pick the first Cyrillic query variant, falling back to the first
/// query. The Russian trackers index localized titles almost
/// exclusively, so an original-language query just wastes the request.
pub(crate) fn cyrillic_first(queries: &[String]) -> Option<&String> {
    queries
        .iter()
        .find(|q| q.chars().any(|c| matches!(c, '\u{0400}'..='\u{04FF}')))
        .or_else(|| queries.first())
}

/// The full default adapter set.
pub fn default_indexers(config: &SearchConfig) -> Vec<Arc<dyn Indexer>> {
    let timeout = Duration::from_secs(config.timeout_secs as u64);
    let quota = config.per_source_quota;
    vec![
        Arc::new(RutorIndexer::new(timeout, quota)),
        Arc::new(YtsIndexer::new(timeout, quota)),
        Arc::new(X1337Indexer::new(timeout, quota)),
        Arc::new(RutrackerIndexer::new(timeout, quota)),
        Arc::new(KinozalIndexer::new(timeout, quota)),
        Arc::new(EztvIndexer::new(timeout, quota)),
    ]
}
