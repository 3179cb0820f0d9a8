use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::{handlers, jobs, middleware, resolve, search};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Health and metrics stay reachable without credentials
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics));

    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        // Search
        .route("/media/{id}/search", get(search::search_media))
        // Link resolution and descriptor proxy
        .route("/resolve", get(resolve::resolve_link))
        .route("/descriptor", get(resolve::fetch_descriptor))
        // Download jobs
        .route("/jobs", post(jobs::start_job))
        .route("/jobs/{id}/progress", get(jobs::progress))
        .route("/jobs/pause", post(jobs::pause_job))
        .route("/jobs/resume", post(jobs::resume_job))
        .route("/jobs/stop", post(jobs::stop_job))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_middleware,
        ));

    let api_routes = public_routes
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(middleware::metrics_middleware))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
