//! RuTracker adapter (form-POST search, HTML results table).
//!
//! Listing rows never carry magnets; the detail page link goes through
//! the link resolver, which knows the `dl-stub` download anchors.

use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

use crate::search::heuristics::{matches_query_tokens, year_matches};
use crate::search::quality::detect_quality;
use crate::search::{CandidateResult, Indexer, SearchError};

use super::{build_client, cyrillic_first, element_text, selector};

const BASE_URL: &str = "https://rutracker.org/forum";
const ROWS_PER_PAGE: usize = 7;

pub struct RutrackerIndexer {
    client: reqwest::Client,
    base_url: String,
    quota: usize,
}

impl RutrackerIndexer {
    pub fn new(timeout: Duration, quota: usize) -> Self {
        Self {
            client: build_client(timeout),
            base_url: BASE_URL.to_string(),
            quota,
        }
    }
}

fn parse_rows(
    body: &str,
    base_url: &str,
    query: &str,
    year: Option<i32>,
    quota: usize,
) -> Result<Vec<CandidateResult>, SearchError> {
    let doc = Html::parse_document(body);
    let row_sel = selector("table.forumline tr.hl-tr")?;
    let title_sel = selector("td.t-title a")?;
    let seeds_sel = selector("td.seedmed b")?;
    let leeches_sel = selector("td.leechmed b")?;
    let size_sel = selector("td.tor-size")?;

    let mut results = Vec::new();
    for row in doc.select(&row_sel).take(ROWS_PER_PAGE) {
        let Some(title_anchor) = row.select(&title_sel).next() else {
            continue;
        };
        let Some(href) = title_anchor.value().attr("href") else {
            continue;
        };
        let name = element_text(title_anchor);

        if !matches_query_tokens(&name, query) || !year_matches(&name, year) {
            continue;
        }

        let seeds = row
            .select(&seeds_sel)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "0".to_string());
        let leechers = row
            .select(&leeches_sel)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "0".to_string());
        let size = row
            .select(&size_sel)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "Unknown".to_string());

        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{base_url}/{href}")
        };

        results.push(CandidateResult {
            quality: detect_quality(&name).to_string(),
            name,
            url,
            size,
            seeds,
            leechers,
            engine: "RuTracker".to_string(),
            // The resolver pulls the download link from the detail page
            magnet_uri: None,
            descriptor_url: None,
        });

        if results.len() >= quota {
            break;
        }
    }

    Ok(results)
}

#[async_trait]
impl Indexer for RutrackerIndexer {
    fn name(&self) -> &str {
        "RuTracker"
    }

    async fn search(
        &self,
        queries: &[String],
        year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, SearchError> {
        // Russian-centric tracker, so a Cyrillic query variant wins
        let Some(query) = cyrillic_first(queries) else {
            return Ok(Vec::new());
        };

        let url = format!("{}/tracker.php", self.base_url);
        debug!(url = %url, query = %query, "Searching RuTracker");

        let response = match self
            .client
            .post(&url)
            .form(&[("nm", query.as_str())])
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                return Err(SearchError::ApiError(format!("HTTP {}", resp.status())));
            }
            Err(e) => {
                warn!(error = %e, "RuTracker request failed");
                return Err(SearchError::from_reqwest(e));
            }
        };

        let body = response
            .text()
            .await
            .map_err(SearchError::from_reqwest)?;

        parse_rows(&body, &self.base_url, query, year, self.quota)
    }
}
