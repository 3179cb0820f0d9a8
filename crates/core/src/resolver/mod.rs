//! Detail-page link resolution.
//!
//! Search results often carry a detail-page URL instead of something a
//! downloader can consume. The resolver fetches that page and extracts
//! magnet URIs and direct descriptor (.torrent) links, with per-host
//! rules for the sources we index and a generic fallback for everything
//! else. Finding nothing is not an error: the caller offers the page
//! URL for manual navigation.

use std::time::Duration;

use reqwest::Url;
use scraper::Html;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::search::adapters::build_client;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Page returned status {0}")]
    PageError(u16),

    #[error("Failed to parse page: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        ResolveError::ConnectionFailed(e.to_string())
    }
}

/// Links extracted from a detail page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedLinks {
    /// Source label, echoed from the request.
    pub source: String,
    pub magnet_links: Vec<String>,
    pub descriptor_links: Vec<String>,
}

impl ResolvedLinks {
    pub fn is_empty(&self) -> bool {
        self.magnet_links.is_empty() && self.descriptor_links.is_empty()
    }
}

pub struct LinkResolver {
    client: reqwest::Client,
}

impl LinkResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
        }
    }

    /// Resolve a result URL into downloadable links.
    ///
    /// Magnet URIs pass through unchanged; YTS result URLs already are
    /// the descriptor; every other host gets its detail page fetched
    /// and scraped.
    pub async fn resolve(
        &self,
        url: &str,
        engine: Option<&str>,
    ) -> Result<ResolvedLinks, ResolveError> {
        let mut links = ResolvedLinks {
            source: engine.unwrap_or("unknown").to_string(),
            ..Default::default()
        };

        if url.starts_with("magnet:") {
            links.magnet_links.push(url.to_string());
            return Ok(links);
        }

        let page = Url::parse(url).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;
        let host = page.host_str().unwrap_or_default().to_string();

        // YTS hands out direct .torrent URLs from its API already
        if host.contains("yts.mx") || host.contains("yify") {
            links.descriptor_links.push(url.to_string());
            return Ok(links);
        }

        let response = self.client.get(page.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::PageError(status.as_u16()));
        }
        let body = response.text().await?;

        extract_links(&page, &host, &body, &mut links)?;
        debug!(
            url = url,
            magnets = links.magnet_links.len(),
            descriptors = links.descriptor_links.len(),
            "Detail page resolved"
        );
        Ok(links)
    }
}

fn sel(css: &str) -> Result<scraper::Selector, ResolveError> {
    scraper::Selector::parse(css).map_err(|e| ResolveError::Parse(e.to_string()))
}

/// Resolve an anchor href against the page it came from.
fn absolutize(page: &Url, href: &str) -> Option<String> {
    if href.starts_with("magnet:") || href.starts_with("http") {
        return Some(href.to_string());
    }
    page.join(href).ok().map(|u| u.to_string())
}

/// Synchronous, since `scraper::Html` is not `Send`.
fn extract_links(
    page: &Url,
    host: &str,
    body: &str,
    links: &mut ResolvedLinks,
) -> Result<(), ResolveError> {
    let document = Html::parse_document(body);
    let magnet_sel = sel(r#"a[href^="magnet:"]"#)?;

    if host.contains("1337x") {
        for anchor in document.select(&sel("a.btn-download")?) {
            if let Some(href) = anchor.value().attr("href").and_then(|h| absolutize(page, h)) {
                links.descriptor_links.push(href);
            }
        }
        for anchor in document.select(&magnet_sel) {
            if let Some(href) = anchor.value().attr("href") {
                links.magnet_links.push(href.to_string());
            }
        }
    } else if host.contains("rutracker") {
        if let Some(href) = document
            .select(&magnet_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            links.magnet_links.push(href.to_string());
        }
        if let Some(href) = document
            .select(&sel("a.dl-stub, a.dl-link")?)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|h| absolutize(page, h))
        {
            links.descriptor_links.push(href);
        }
    } else if host.contains("eztv") {
        if let Some(href) = document
            .select(&magnet_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            links.magnet_links.push(href.to_string());
        }
    } else {
        for anchor in document.select(&magnet_sel) {
            if let Some(href) = anchor.value().attr("href") {
                links.magnet_links.push(href.to_string());
            }
        }
        let descriptor_sel =
            sel(r#"a[href$=".torrent"], a.torrent-download-link, a.dl-link, a.download"#)?;
        for anchor in document.select(&descriptor_sel) {
            if let Some(href) = anchor.value().attr("href").and_then(|h| absolutize(page, h)) {
                links.descriptor_links.push(href);
            }
        }
    }

    Ok(())
}
