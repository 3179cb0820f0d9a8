//! Concurrent multi-source search with two-tier ranking.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::TrackerConfig;

use super::query::build_queries;
use super::{CandidateResult, Indexer, SEEDS_UNKNOWN};

/// Append fallback search links when fewer genuine listings were found.
const FALLBACK_THRESHOLD: usize = 3;

/// Aggregated search outcome.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Top-priority query that was used for fallback links.
    pub query: String,
    /// Genuine listings ranked by seeds, then fallback links.
    pub results: Vec<CandidateResult>,
    /// Per-source failures (source name -> error message).
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub indexer_errors: HashMap<String, String>,
}

/// Fans a query out to every configured indexer concurrently, contains
/// per-source failures, and ranks the merged results: genuine listings
/// sorted by seed count descending (stable), fallback links after them
/// in construction order.
pub struct MultiSearcher {
    indexers: Vec<Arc<dyn Indexer>>,
    trackers: Vec<TrackerConfig>,
}

impl MultiSearcher {
    pub fn new(indexers: Vec<Arc<dyn Indexer>>, trackers: Vec<TrackerConfig>) -> Self {
        Self { indexers, trackers }
    }

    pub async fn search(
        &self,
        title: &str,
        original_title: Option<&str>,
        year: Option<i32>,
    ) -> SearchOutcome {
        let queries = build_queries(title, original_title, year);
        let Some(primary_query) = queries.first().cloned() else {
            return SearchOutcome {
                query: String::new(),
                results: Vec::new(),
                indexer_errors: HashMap::new(),
            };
        };

        debug!(queries = ?queries, "Starting parallel search");

        let search_futures: Vec<_> = self
            .indexers
            .iter()
            .map(|indexer| {
                let indexer = Arc::clone(indexer);
                let queries = queries.clone();
                async move {
                    let result = indexer.search(&queries, year).await;
                    (indexer.name().to_string(), result)
                }
            })
            .collect();

        let outcomes = futures::future::join_all(search_futures).await;

        let mut genuine: Vec<CandidateResult> = Vec::new();
        let mut indexer_errors = HashMap::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(mut results) => genuine.append(&mut results),
                Err(e) => {
                    warn!(indexer = %name, error = %e, "Indexer search failed");
                    indexer_errors.insert(name, e.to_string());
                }
            }
        }

        // Stable sort keeps equal-seed listings in source order
        genuine.sort_by_key(|r| Reverse(r.seed_count()));

        let mut results = genuine;
        if results.len() < FALLBACK_THRESHOLD {
            results.extend(self.fallback_links(&primary_query));
        }

        debug!(results = results.len(), "Search complete");

        SearchOutcome {
            query: primary_query,
            results,
            indexer_errors,
        }
    }

    /// Search-engine and raw tracker links offered when scraping came
    /// up short. Always usable by hand even when every source is down.
    fn fallback_links(&self, query: &str) -> Vec<CandidateResult> {
        let encoded = urlencoding::encode(query).into_owned();
        let engines = [
            (
                "Google",
                format!("https://www.google.com/search?q={encoded}+torrent"),
            ),
            (
                "Yandex",
                format!("https://yandex.ru/search/?text={encoded}+torrent"),
            ),
            (
                "DuckDuckGo",
                format!("https://duckduckgo.com/?q={encoded}+torrent"),
            ),
        ];

        let mut links: Vec<CandidateResult> = engines
            .into_iter()
            .map(|(name, url)| fallback_entry(name, &format!("Search {name}: {query}"), url))
            .collect();

        for tracker in &self.trackers {
            let url = tracker.search_url.replace("{query}", &encoded);
            links.push(fallback_entry(
                &tracker.name,
                &format!("Search {}: {query}", tracker.name),
                url,
            ));
        }

        links
    }
}

fn fallback_entry(engine: &str, name: &str, url: String) -> CandidateResult {
    CandidateResult {
        name: name.to_string(),
        url,
        size: SEEDS_UNKNOWN.to_string(),
        quality: SEEDS_UNKNOWN.to_string(),
        seeds: SEEDS_UNKNOWN.to_string(),
        leechers: SEEDS_UNKNOWN.to_string(),
        engine: engine.to_string(),
        magnet_uri: None,
        descriptor_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchError;
    use crate::testing::MockIndexer;

    fn candidate(name: &str, seeds: &str) -> CandidateResult {
        CandidateResult {
            name: name.to_string(),
            url: format!("http://example.org/{name}"),
            size: "1 GB".to_string(),
            quality: "1080p".to_string(),
            seeds: seeds.to_string(),
            leechers: "0".to_string(),
            engine: "Mock".to_string(),
            magnet_uri: None,
            descriptor_url: None,
        }
    }

    fn trackers() -> Vec<TrackerConfig> {
        vec![TrackerConfig {
            name: "ExampleTracker".to_string(),
            search_url: "https://tracker.example/search?q={query}".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_ranking_by_seed_count_desc() {
        let indexer = MockIndexer::new("Mock").with_results(vec![
            candidate("five", "5"),
            candidate("none", "0"),
            candidate("twelve", "12"),
        ]);
        let searcher = MultiSearcher::new(vec![Arc::new(indexer)], vec![]);

        let outcome = searcher.search("Dune", None, Some(2021)).await;

        let seeds: Vec<&str> = outcome
            .results
            .iter()
            .map(|r| r.seeds.as_str())
            .collect();
        assert_eq!(&seeds[..3], &["12", "5", "0"]);
        assert!(outcome.indexer_errors.is_empty());
    }

    #[tokio::test]
    async fn test_fallbacks_appended_when_below_threshold() {
        let indexer = MockIndexer::new("Mock").with_results(vec![candidate("only", "4")]);
        let searcher = MultiSearcher::new(vec![Arc::new(indexer)], trackers());

        let outcome = searcher.search("Dune", None, Some(2021)).await;

        // 1 genuine + 3 engines + 1 tracker
        assert_eq!(outcome.results.len(), 5);
        assert!(!outcome.results[0].is_search_link());
        assert!(outcome.results[1..].iter().all(|r| r.is_search_link()));
        assert_eq!(outcome.results[1].engine, "Google");
        assert_eq!(outcome.results[4].engine, "ExampleTracker");
        assert!(outcome.results[4].url.contains("Dune%202021"));
    }

    #[tokio::test]
    async fn test_no_fallbacks_at_threshold() {
        let indexer = MockIndexer::new("Mock").with_results(vec![
            candidate("a", "3"),
            candidate("b", "2"),
            candidate("c", "1"),
        ]);
        let searcher = MultiSearcher::new(vec![Arc::new(indexer)], trackers());

        let outcome = searcher.search("Dune", None, None).await;
        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.results.iter().all(|r| !r.is_search_link()));
    }

    #[tokio::test]
    async fn test_failed_indexer_is_contained() {
        let ok = MockIndexer::new("Good").with_results(vec![candidate("hit", "9")]);
        let bad = MockIndexer::new("Bad")
            .with_error(|| SearchError::ConnectionFailed("refused".to_string()));
        let searcher = MultiSearcher::new(vec![Arc::new(ok), Arc::new(bad)], vec![]);

        let outcome = searcher.search("Dune", None, None).await;

        assert!(outcome.results.iter().any(|r| r.name == "hit"));
        assert_eq!(outcome.indexer_errors.len(), 1);
        assert!(outcome.indexer_errors.contains_key("Bad"));
    }

    #[tokio::test]
    async fn test_all_sources_down_still_yields_fallbacks() {
        let bad = MockIndexer::new("Bad").with_error(|| SearchError::Timeout);
        let searcher = MultiSearcher::new(vec![Arc::new(bad)], trackers());

        let outcome = searcher.search("Dune", None, None).await;

        assert_eq!(outcome.results.len(), 4);
        assert!(outcome.results.iter().all(|r| r.is_search_link()));
        assert_eq!(outcome.indexer_errors.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_titles_empty_outcome() {
        let searcher = MultiSearcher::new(vec![], trackers());
        let outcome = searcher.search("", None, None).await;
        assert!(outcome.results.is_empty());
        assert!(outcome.query.is_empty());
    }
}
