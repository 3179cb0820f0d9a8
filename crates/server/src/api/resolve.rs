//! Link resolution and descriptor proxy handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use magnetar_core::resolver::{ResolveError, ResolvedLinks};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub url: String,
    #[serde(default)]
    pub engine: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub success: bool,
    #[serde(flatten)]
    pub links: ResolvedLinks,
    /// Advisory when nothing was extracted automatically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

/// GET /api/v1/resolve?url=...&engine=...
///
/// Turn a search result URL into downloadable links. An empty
/// extraction is a success with a "navigate manually" advisory, not an
/// error.
pub async fn resolve_link(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, (StatusCode, Json<ErrorResponse>)> {
    let links = state
        .resolver()
        .resolve(&query.url, query.engine.as_deref())
        .await
        .map_err(|e| {
            warn!(url = %query.url, error = %e, "Link resolution failed");
            resolve_error_response(e)
        })?;

    let (message, page_url) = if links.is_empty() {
        (
            Some("No download links were found automatically. Please open the page manually.".to_string()),
            Some(query.url.clone()),
        )
    } else {
        (None, None)
    };

    Ok(Json(ResolveResponse {
        success: true,
        links,
        message,
        page_url,
    }))
}

fn resolve_error_response(e: ResolveError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        ResolveError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        ResolveError::PageError(code) => {
            StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        ResolveError::ConnectionFailed(_) | ResolveError::Parse(_) => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct DescriptorQuery {
    pub url: String,
}

/// GET /api/v1/descriptor?url=...
///
/// Proxy a descriptor file download. The response always carries a
/// ".torrent" attachment filename, taken from Content-Disposition when
/// the upstream provides one and from the URL otherwise.
pub async fn fetch_descriptor(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DescriptorQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let response = state
        .descriptor_client()
        .get(&query.url)
        .send()
        .await
        .map_err(|e| {
            warn!(url = %query.url, error = %e, "Descriptor fetch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Failed to fetch descriptor: {e}"),
                }),
            )
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err((
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ErrorResponse {
                error: format!("Descriptor download failed with status {status}"),
            }),
        ));
    }

    let header_filename = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_disposition);
    let filename = descriptor_filename(&query.url, header_filename);

    let bytes = response.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("Failed to read descriptor body: {e}"),
            }),
        )
    })?;

    Ok((
        [
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (
                header::CONTENT_TYPE,
                "application/x-bittorrent".to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn filename_from_disposition(disposition: &str) -> Option<String> {
    let re = regex_lite::Regex::new(r#"filename="?([^";]+)"?"#).ok()?;
    re.captures(disposition)
        .map(|c| c[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Pick the attachment filename and force the ".torrent" extension.
fn descriptor_filename(url: &str, from_header: Option<String>) -> String {
    let mut filename = from_header.unwrap_or_else(|| {
        let last = url.rsplit('/').next().unwrap_or_default();
        let last = last.split('?').next().unwrap_or_default();
        if last.is_empty() {
            "download".to_string()
        } else {
            last.to_string()
        }
    });
    if !filename.ends_with(".torrent") {
        filename.push_str(".torrent");
    }
    filename
}
