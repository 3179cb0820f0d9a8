//! EZTV adapter (HTML listing, magnets inline).

use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

use crate::search::heuristics::matches_query_tokens;
use crate::search::quality::detect_quality;
use crate::search::{CandidateResult, Indexer, SearchError};

use super::{build_client, element_text, selector};

const BASE_URL: &str = "https://eztv.re";
const ROWS_PER_PAGE: usize = 10;

pub struct EztvIndexer {
    client: reqwest::Client,
    base_url: String,
    quota: usize,
}

impl EztvIndexer {
    pub fn new(timeout: Duration, quota: usize) -> Self {
        Self {
            client: build_client(timeout),
            base_url: BASE_URL.to_string(),
            quota,
        }
    }
}

fn parse_rows(body: &str, query: &str, quota: usize) -> Result<Vec<CandidateResult>, SearchError> {
    let doc = Html::parse_document(body);
    let row_sel = selector("table tr.forum_header_border")?;
    let title_sel = selector("td.forum_thread_post a.epinfo")?;
    let magnet_sel = selector("td:nth-child(3) a")?;
    let size_sel = selector("td:nth-child(4)")?;
    let seeds_sel = selector("td:nth-child(6)")?;

    let mut results = Vec::new();
    for row in doc.select(&row_sel).take(ROWS_PER_PAGE) {
        let Some(title_el) = row.select(&title_sel).next() else {
            continue;
        };
        let name = element_text(title_el);
        if !matches_query_tokens(&name, query) {
            continue;
        }

        // Episode rows without a magnet are useless here
        let Some(magnet) = row
            .select(&magnet_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .filter(|h| h.starts_with("magnet:"))
            .map(|h| h.to_string())
        else {
            continue;
        };

        let size = row
            .select(&size_sel)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "Unknown".to_string());
        let seeds = row
            .select(&seeds_sel)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "0".to_string());

        results.push(CandidateResult {
            quality: detect_quality(&name).to_string(),
            name,
            url: magnet.clone(),
            size,
            seeds,
            leechers: "0".to_string(),
            engine: "EZTV".to_string(),
            magnet_uri: Some(magnet),
            descriptor_url: None,
        });

        if results.len() >= quota {
            break;
        }
    }

    Ok(results)
}

#[async_trait]
impl Indexer for EztvIndexer {
    fn name(&self) -> &str {
        "EZTV"
    }

    async fn search(
        &self,
        queries: &[String],
        _year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, SearchError> {
        // Episodic content rarely benefits from query variants; one
        // request with the top-priority query.
        let Some(query) = queries.first() else {
            return Ok(Vec::new());
        };

        let url = format!("{}/search/{}", self.base_url, urlencoding::encode(query));
        debug!(url = %url, "Searching EZTV");

        let response = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                return Err(SearchError::ApiError(format!("HTTP {}", resp.status())));
            }
            Err(e) => {
                warn!(error = %e, "EZTV request failed");
                return Err(SearchError::from_reqwest(e));
            }
        };

        let body = response
            .text()
            .await
            .map_err(SearchError::from_reqwest)?;

        parse_rows(&body, query, self.quota)
    }
}
