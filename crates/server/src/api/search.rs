//! Media search API handler.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use magnetar_core::search::SearchOutcome;

use crate::metrics::{INDEXER_FAILURES_TOTAL, SEARCHES_TOTAL};
use crate::state::AppState;

use super::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /api/v1/media/{id}/search
///
/// Search every configured indexer for the media record's title. An
/// unknown id and an id owned by someone else get the same 404.
pub async fn search_media(
    State(state): State<Arc<AppState>>,
    Path(media_id): Path<i64>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SearchOutcome>, (StatusCode, Json<ErrorResponse>)> {
    let media = state.catalog().media(media_id).map_err(|_| not_found())?;
    if media.user_id != user_id {
        return Err(not_found());
    }

    info!(media_id = media_id, title = %media.title, "Media search requested");

    let outcome = state
        .searcher()
        .search(&media.title, media.original_title.as_deref(), media.year)
        .await;

    for indexer in outcome.indexer_errors.keys() {
        INDEXER_FAILURES_TOTAL.with_label_values(&[indexer]).inc();
    }
    let label = if outcome.results.is_empty() { "empty" } else { "ok" };
    SEARCHES_TOTAL.with_label_values(&[label]).inc();

    Ok(Json(outcome))
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Media not found".to_string(),
        }),
    )
}
