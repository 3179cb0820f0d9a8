//! Rutor adapter (HTML listing table).

use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

use crate::search::heuristics::{matches_query_tokens, year_matches};
use crate::search::quality::detect_quality;
use crate::search::{CandidateResult, Indexer, SearchError};

use super::{build_client, element_text, selector};

const BASE_URL: &str = "http://rutor.info";
const ROWS_PER_PAGE: usize = 10;

pub struct RutorIndexer {
    client: reqwest::Client,
    base_url: String,
    quota: usize,
}

impl RutorIndexer {
    pub fn new(timeout: Duration, quota: usize) -> Self {
        Self {
            client: build_client(timeout),
            base_url: BASE_URL.to_string(),
            quota,
        }
    }
}

/// Parse the `#index` results table. Listing rows carry the name cell
/// at index 1 and size/seeds/leeches at 3..=5; the name cell holds a
/// magnet anchor, a `.downgif` .torrent anchor and the detail link.
fn parse_rows(
    body: &str,
    base_url: &str,
    query: &str,
    year: Option<i32>,
    quota: usize,
) -> Result<Vec<CandidateResult>, SearchError> {
    let doc = Html::parse_document(body);
    let table_sel = selector("#index")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    let anchor_sel = selector("a")?;

    let Some(table) = doc.select(&table_sel).next() else {
        return Ok(Vec::new());
    };

    let mut results = Vec::new();
    for row in table.select(&row_sel).skip(1).take(ROWS_PER_PAGE) {
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() < 6 {
            continue;
        }
        let name_cell = cells[1];

        let mut magnet = None;
        let mut descriptor_href = None;
        let mut name_anchor = None;
        for anchor in name_cell.select(&anchor_sel) {
            let href = anchor.value().attr("href").unwrap_or("");
            if href.starts_with("magnet:") {
                magnet = Some(href.to_string());
            } else if anchor.value().classes().any(|c| c == "downgif") {
                descriptor_href = Some(href.to_string());
            } else if name_anchor.is_none() {
                name_anchor = Some(anchor);
            }
        }
        let Some(name_anchor) = name_anchor else {
            continue;
        };
        let name = element_text(name_anchor);

        if !year_matches(&name, year) || !matches_query_tokens(&name, query) {
            continue;
        }

        let detail_url = name_anchor
            .value()
            .attr("href")
            .map(|h| format!("{base_url}{h}"));

        let url = magnet
            .clone()
            .or(detail_url)
            .unwrap_or_default();

        results.push(CandidateResult {
            quality: detect_quality(&name).to_string(),
            name,
            url,
            size: element_text(cells[3]),
            seeds: element_text(cells[4]),
            leechers: element_text(cells[5]),
            engine: "Rutor".to_string(),
            magnet_uri: magnet,
            descriptor_url: descriptor_href.map(|h| format!("{base_url}{h}")),
        });

        if results.len() >= quota {
            break;
        }
    }

    Ok(results)
}

#[async_trait]
impl Indexer for RutorIndexer {
    fn name(&self) -> &str {
        "Rutor"
    }

    async fn search(
        &self,
        queries: &[String],
        year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, SearchError> {
        let mut results = Vec::new();
        let mut last_err = None;

        for query in queries.iter().take(2) {
            let url = format!(
                "{}/search/{}",
                self.base_url,
                urlencoding::encode(query)
            );
            debug!(url = %url, "Searching Rutor");

            let body = match self.client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => match resp.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!(error = %e, "Rutor body read failed");
                        last_err = Some(SearchError::from_reqwest(e));
                        continue;
                    }
                },
                Ok(resp) => {
                    last_err = Some(SearchError::ApiError(format!("HTTP {}", resp.status())));
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "Rutor request failed");
                    last_err = Some(SearchError::from_reqwest(e));
                    continue;
                }
            };

            let mut found = parse_rows(&body, &self.base_url, query, year, self.quota)?;
            results.append(&mut found);
            if results.len() >= self.quota {
                break;
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

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r##"
<html><body>
<table id="index">
  <tr><td>Date</td><td>Name</td><td>Comments</td><td>Size</td><td>S</td><td>L</td></tr>
  <tr>
    <td>01 Jan 17</td>
    <td>
      <a href="magnet:?xt=urn:btih:aaa">m</a>
      <a class="downgif" href="/download/12345">d</a>
      <a href="/torrent/12345">Three.Seconds.2017.1080p.BluRay</a>
    </td>
    <td>5</td>
    <td>9.77 GB</td>
    <td><span>12</span></td>
    <td>3</td>
  </tr>
  <tr>
    <td>02 Jan 15</td>
    <td><a href="/torrent/999">Unrelated.Thing.2015.720p</a></td>
    <td>0</td>
    <td>1.00 GB</td>
    <td>4</td>
    <td>1</td>
  </tr>
</table>
</body></html>
"##;

    #[test]
    fn test_parse_rows_extracts_listing() {
        let results =
            parse_rows(FIXTURE, "http://rutor.info", "Three Seconds 2017", Some(2017), 3).unwrap();
        assert_eq!(results.len(), 1);

        let r = &results[0];
        assert_eq!(r.name, "Three.Seconds.2017.1080p.BluRay");
        assert_eq!(r.engine, "Rutor");
        assert_eq!(r.quality, "1080p");
        assert_eq!(r.size, "9.77 GB");
        assert_eq!(r.seeds, "12");
        assert_eq!(r.leechers, "3");
        assert_eq!(r.magnet_uri.as_deref(), Some("magnet:?xt=urn:btih:aaa"));
        assert_eq!(
            r.descriptor_url.as_deref(),
            Some("http://rutor.info/download/12345")
        );
        // magnet preferred as the primary url
        assert!(r.url.starts_with("magnet:"));
    }

    #[test]
    fn test_parse_rows_filters_wrong_year_and_tokens() {
        let results =
            parse_rows(FIXTURE, "http://rutor.info", "Three Seconds 2017", Some(2017), 3).unwrap();
        assert!(results.iter().all(|r| !r.name.contains("Unrelated")));
    }

    #[test]
    fn test_parse_rows_missing_table_is_empty() {
        let results = parse_rows(
            "<html><body>nope</body></html>",
            "http://rutor.info",
            "q",
            None,
            3,
        )
        .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_rows_respects_quota() {
        let mut body = String::from(r#"<table id="index"><tr><td>h</td></tr>"#);
        for i in 0..6 {
            body.push_str(&format!(
                r#"<tr><td>d</td><td><a href="/torrent/{i}">Three Seconds part {i}</a></td>
                   <td>0</td><td>1 GB</td><td>{i}</td><td>0</td></tr>"#
            ));
        }
        body.push_str("</table>");

        let results = parse_rows(&body, "http://rutor.info", "Three Seconds", None, 3).unwrap();
        assert_eq!(results.len(), 3);
    }
}
