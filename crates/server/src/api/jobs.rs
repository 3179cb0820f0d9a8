//! Download job API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use magnetar_core::jobs::{progress_stream, JobError};

use crate::metrics::{JOBS_STARTED_TOTAL, PROGRESS_STREAMS_ACTIVE};
use crate::state::AppState;

use super::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct StartJobRequest {
    pub category: String,
    pub filename: String,
    pub file_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StartJobResponse {
    pub job_id: String,
    pub status: String,
}

/// POST /api/v1/jobs
///
/// Start a download job for a stored descriptor file.
pub async fn start_job(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<StartJobRequest>,
) -> Result<Json<StartJobResponse>, (StatusCode, Json<ErrorResponse>)> {
    let result = state
        .job_manager()
        .create_job(&user_id, &body.category, &body.filename, body.file_id)
        .await;

    match result {
        Ok(job_id) => {
            JOBS_STARTED_TOTAL.with_label_values(&["ok"]).inc();
            info!(job_id = %job_id, file_id = body.file_id, "Download job created");
            Ok(Json(StartJobResponse {
                job_id,
                status: "downloading".to_string(),
            }))
        }
        Err(e) => {
            JOBS_STARTED_TOTAL.with_label_values(&["error"]).inc();
            Err(job_error_response(e))
        }
    }
}

/// GET /api/v1/jobs/{id}/progress
///
/// Push progress snapshots over SSE until the job reaches a terminal
/// state, then close. Unknown and foreign jobs stream a single error
/// event.
pub async fn progress(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    AuthUser(user_id): AuthUser,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let interval = Duration::from_millis(state.config().download.stream_interval_ms);
    let stream = progress_stream(
        state.job_manager().registry(),
        state.job_manager().catalog(),
        &job_id,
        &user_id,
        interval,
    )
    .await;

    PROGRESS_STREAMS_ACTIVE.inc();
    let guard = StreamGuard;
    let events = stream.map(move |snapshot| {
        let _ = &guard;
        Event::default().json_data(&snapshot).map_err(axum::Error::new)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Decrements the active-streams gauge when the SSE stream is dropped,
/// whether it completed or the client disconnected.
struct StreamGuard;

impl Drop for StreamGuard {
    fn drop(&mut self) {
        PROGRESS_STREAMS_ACTIVE.dec();
    }
}

#[derive(Debug, Deserialize)]
pub struct JobControlRequest {
    pub file_id: i64,
}

#[derive(Debug, Serialize)]
pub struct JobControlResponse {
    pub status: String,
}

/// POST /api/v1/jobs/pause
pub async fn pause_job(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<JobControlRequest>,
) -> Result<Json<JobControlResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .job_manager()
        .pause(&user_id, body.file_id)
        .await
        .map_err(job_error_response)?;
    Ok(Json(JobControlResponse {
        status: "paused".to_string(),
    }))
}

/// POST /api/v1/jobs/resume
pub async fn resume_job(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<JobControlRequest>,
) -> Result<Json<JobControlResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .job_manager()
        .resume(&user_id, body.file_id)
        .await
        .map_err(job_error_response)?;
    Ok(Json(JobControlResponse {
        status: "resumed".to_string(),
    }))
}

/// POST /api/v1/jobs/stop
pub async fn stop_job(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<JobControlRequest>,
) -> Result<Json<JobControlResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .job_manager()
        .stop(&user_id, body.file_id)
        .await
        .map_err(job_error_response)?;
    Ok(Json(JobControlResponse {
        status: "stopped".to_string(),
    }))
}

fn job_error_response(e: JobError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        JobError::NotFound | JobError::DescriptorMissing(_) => StatusCode::NOT_FOUND,
        JobError::AlreadyActive => StatusCode::CONFLICT,
        JobError::Transfer(_) => StatusCode::BAD_GATEWAY,
        JobError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
