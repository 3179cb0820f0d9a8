//! YTS adapter (JSON API).
//!
//! The only source with a proper API. Listing names are synthesized as
//! "title [quality]" since the API reports per-quality torrent entries
//! under one movie.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::search::{CandidateResult, Indexer, SearchError};

use super::build_client;

const API_URL: &str = "https://yts.mx/api/v2/list_movies.json";

pub struct YtsIndexer {
    client: reqwest::Client,
    api_url: String,
    quota: usize,
}

impl YtsIndexer {
    pub fn new(timeout: Duration, quota: usize) -> Self {
        Self {
            client: build_client(timeout),
            api_url: API_URL.to_string(),
            quota,
        }
    }
}

#[derive(Debug, Deserialize)]
struct YtsResponse {
    status: String,
    #[serde(default)]
    data: Option<YtsData>,
}

#[derive(Debug, Deserialize)]
struct YtsData {
    #[serde(default)]
    movie_count: u64,
    #[serde(default)]
    movies: Vec<YtsMovie>,
}

#[derive(Debug, Deserialize)]
struct YtsMovie {
    #[serde(default)]
    title_long: String,
    #[serde(default)]
    year: i32,
    #[serde(default)]
    torrents: Vec<YtsTorrent>,
}

#[derive(Debug, Deserialize)]
struct YtsTorrent {
    #[serde(default)]
    quality: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    seeds: u64,
    #[serde(default)]
    peers: u64,
    #[serde(default)]
    url: String,
}

fn collect_results(response: YtsResponse, year: Option<i32>, quota: usize) -> Vec<CandidateResult> {
    let mut results = Vec::new();

    if response.status != "ok" {
        return results;
    }
    let Some(data) = response.data else {
        return results;
    };
    if data.movie_count == 0 {
        return results;
    }

    for movie in data.movies {
        // Off-by-one tolerance: festival vs wide-release years differ
        if let Some(year) = year {
            if (movie.year - year).abs() > 1 {
                continue;
            }
        }

        for torrent in movie.torrents {
            if torrent.url.is_empty() {
                continue;
            }
            let quality = if torrent.quality.is_empty() {
                "Unknown".to_string()
            } else {
                torrent.quality
            };
            results.push(CandidateResult {
                name: format!("{} [{quality}]", movie.title_long),
                url: torrent.url.clone(),
                size: torrent.size,
                quality,
                seeds: torrent.seeds.to_string(),
                leechers: torrent.peers.to_string(),
                engine: "YTS".to_string(),
                magnet_uri: None,
                descriptor_url: Some(torrent.url),
            });
            if results.len() >= quota {
                return results;
            }
        }
    }

    results
}

#[async_trait]
impl Indexer for YtsIndexer {
    fn name(&self) -> &str {
        "YTS"
    }

    async fn search(
        &self,
        queries: &[String],
        year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, SearchError> {
        let mut last_err = None;

        for query in queries.iter().take(2) {
            let url = format!(
                "{}?query_term={}&limit=10&sort=seeds",
                self.api_url,
                urlencoding::encode(query)
            );
            debug!(url = %url, "Searching YTS");

            let response = match self.client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => resp,
                Ok(resp) => {
                    last_err = Some(SearchError::ApiError(format!("HTTP {}", resp.status())));
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "YTS request failed");
                    last_err = Some(SearchError::from_reqwest(e));
                    continue;
                }
            };

            let parsed: YtsResponse = match response.json().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    last_err = Some(SearchError::Parse(e.to_string()));
                    continue;
                }
            };

            let results = collect_results(parsed, year, self.quota);
            if !results.is_empty() {
                return Ok(results);
            }
        }

        match last_err {
            Some(err) => Err(err),
            None => Ok(Vec::new()),
        }
    }
}
