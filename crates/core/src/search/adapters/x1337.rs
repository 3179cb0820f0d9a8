//! 1337x adapter (HTML listing table, multi-domain failover).
//!
//! Listing rows only expose a detail page link; magnets are fetched
//! later through the link resolver.

use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

use crate::search::heuristics::{matches_query_tokens, year_matches};
use crate::search::quality::detect_quality;
use crate::search::{CandidateResult, Indexer, SearchError};

use super::{build_client, element_text, selector};

const DOMAINS: &[&str] = &["https://1337x.to", "https://1337x.st", "https://1337x.is"];
const ROWS_PER_PAGE: usize = 10;

pub struct X1337Indexer {
    client: reqwest::Client,
    domains: Vec<String>,
    quota: usize,
}

impl X1337Indexer {
    pub fn new(timeout: Duration, quota: usize) -> Self {
        Self {
            client: build_client(timeout),
            domains: DOMAINS.iter().map(|d| d.to_string()).collect(),
            quota,
        }
    }
}

fn parse_rows(
    body: &str,
    domain: &str,
    query: &str,
    year: Option<i32>,
    quota: usize,
) -> Result<Vec<CandidateResult>, SearchError> {
    let doc = Html::parse_document(body);
    let row_sel = selector("table.table-list tbody tr")?;
    let name_sel = selector("td.name")?;
    let link_sel = selector("a:nth-child(2)")?;
    let size_sel = selector("td.size")?;
    let seeds_sel = selector("td.seeds")?;
    let leeches_sel = selector("td.leeches")?;

    let mut results = Vec::new();
    for row in doc.select(&row_sel).take(ROWS_PER_PAGE) {
        let Some(name_cell) = row.select(&name_sel).next() else {
            continue;
        };
        let Some(link) = name_cell.select(&link_sel).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let name = element_text(link);

        if !matches_query_tokens(&name, query) || !year_matches(&name, year) {
            continue;
        }

        let size = row.select(&size_sel).next().map(element_text).unwrap_or_default();
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

        results.push(CandidateResult {
            quality: detect_quality(&name).to_string(),
            name,
            url: format!("{domain}{href}"),
            size,
            seeds,
            leechers,
            engine: "1337x".to_string(),
            // Filled in by the resolver from the detail page
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
impl Indexer for X1337Indexer {
    fn name(&self) -> &str {
        "1337x"
    }

    async fn search(
        &self,
        queries: &[String],
        year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, SearchError> {
        let mut results = Vec::new();
        let mut last_err = None;

        'queries: for query in queries {
            for domain in &self.domains {
                let url = format!("{}/search/{}/1/", domain, urlencoding::encode(query));
                debug!(url = %url, "Searching 1337x");

                let body = match self.client.get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => match resp.text().await {
                        Ok(body) => body,
                        Err(e) => {
                            last_err = Some(SearchError::from_reqwest(e));
                            continue;
                        }
                    },
                    Ok(resp) => {
                        last_err = Some(SearchError::ApiError(format!("HTTP {}", resp.status())));
                        continue;
                    }
                    Err(e) => {
                        warn!(domain = %domain, error = %e, "1337x domain unreachable");
                        last_err = Some(SearchError::from_reqwest(e));
                        continue;
                    }
                };

                let mut found = parse_rows(&body, domain, query, year, self.quota)?;
                results.append(&mut found);
                if !results.is_empty() {
                    // This domain works and the query produced hits
                    break 'queries;
                }
            }
        }

        if results.is_empty() {
            if let Some(err) = last_err {
                return Err(err);
            }
        }
        results.truncate(self.quota);
        Ok(results)
    }
}
