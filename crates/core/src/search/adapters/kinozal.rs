//! Kinozal adapter (HTML listing table).
//!
//! Listing rows link detail pages only; downloads need an account, so
//! candidates carry neither magnet nor descriptor link up front.

use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

use crate::search::heuristics::{matches_query_tokens, year_matches};
use crate::search::quality::detect_quality;
use crate::search::{CandidateResult, Indexer, SearchError};

use super::{build_client, cyrillic_first, element_text, selector};

const BASE_URL: &str = "https://kinozal.tv";
const ROWS_PER_PAGE: usize = 7;

pub struct KinozalIndexer {
    client: reqwest::Client,
    base_url: String,
    quota: usize,
}

impl KinozalIndexer {
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
    let row_sel = selector("table.t_peer tr")?;
    let cell_sel = selector("td")?;
    let anchor_sel = selector("a")?;

    let mut results = Vec::new();
    let rows = doc
        .select(&row_sel)
        // "bg" rows are the header band
        .filter(|row| !row.value().classes().any(|c| c == "bg"))
        .take(ROWS_PER_PAGE);

    for row in rows {
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() < 5 {
            continue;
        }

        let Some(link) = cells[1].select(&anchor_sel).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let name = element_text(link);

        if !matches_query_tokens(&name, query) || !year_matches(&name, year) {
            continue;
        }

        let size = element_text(cells[3]);
        let seeds: String = element_text(cells[4])
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();

        results.push(CandidateResult {
            quality: detect_quality(&name).to_string(),
            name,
            url: format!("{base_url}{href}"),
            size,
            seeds: if seeds.is_empty() {
                "0".to_string()
            } else {
                seeds
            },
            // Search results do not show leechers
            leechers: "0".to_string(),
            engine: "Kinozal".to_string(),
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
impl Indexer for KinozalIndexer {
    fn name(&self) -> &str {
        "Kinozal"
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

        let url = format!(
            "{}/browse.php?s={}",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!(url = %url, "Searching Kinozal");

        let response = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                return Err(SearchError::ApiError(format!("HTTP {}", resp.status())));
            }
            Err(e) => {
                warn!(error = %e, "Kinozal request failed");
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

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
<html><body>
<table class="t_peer w100p">
  <tr class="bg">
    <td>#</td><td>Name</td><td>Comments</td><td>Size</td><td>Seeds</td>
  </tr>
  <tr>
    <td>1</td>
    <td><a href="/details.php?id=500">Движение вверх / 2017 / BDRip (1080p)</a></td>
    <td>3</td>
    <td>11.8 ГБ</td>
    <td> 187 </td>
  </tr>
  <tr>
    <td>2</td>
    <td><a href="/details.php?id=501">Другое кино / 2014 / HDRip</a></td>
    <td>0</td>
    <td>1.4 ГБ</td>
    <td>9</td>
  </tr>
</table>
</body></html>
"#;

    #[test]
    fn test_parse_rows_skips_header_and_extracts_listing() {
        let results = parse_rows(
            FIXTURE,
            "https://kinozal.tv",
            "Движение вверх 2017",
            Some(2017),
            7,
        )
        .unwrap();
        assert_eq!(results.len(), 1);

        let r = &results[0];
        assert_eq!(r.name, "Движение вверх / 2017 / BDRip (1080p)");
        assert_eq!(r.engine, "Kinozal");
        assert_eq!(r.url, "https://kinozal.tv/details.php?id=500");
        assert_eq!(r.size, "11.8 ГБ");
        assert_eq!(r.seeds, "187");
        assert_eq!(r.leechers, "0");
        assert!(r.magnet_uri.is_none());
        assert!(r.descriptor_url.is_none());
    }

    #[test]
    fn test_parse_rows_rejects_year_mismatch() {
        let results = parse_rows(
            FIXTURE,
            "https://kinozal.tv",
            "Другое кино",
            Some(2017),
            7,
        )
        .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_rows_empty_page() {
        let results =
            parse_rows("<html><body></body></html>", "https://kinozal.tv", "q", None, 7).unwrap();
        assert!(results.is_empty());
    }
}
