//! Route table.

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    download_export, get_export_status, get_remote_job, get_thumbnails, get_waveform, health,
    submit_export, submit_remote_job,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

fn api() -> Router<AppState> {
    Router::new()
        .route("/export", post(submit_export))
        .route("/export/:job_id", get(get_export_status))
        .route("/export/:job_id/download", get(download_export))
        // Capabilities share one pair of routes
        .route("/remote/:capability", post(submit_remote_job))
        .route("/remote/:capability/:job_id", get(get_remote_job))
        .route("/videos/:video_id/thumbnails", get(get_thumbnails))
        .route("/videos/:video_id/waveform", get(get_waveform))
}

/// Build the application; `/metrics` is only mounted when a handle is given.
pub fn create_router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new()
        .nest("/api", api())
        .route("/health", get(health));

    if let Some(handle) = prometheus {
        router = router.route("/metrics", get(move || async move { handle.render() }));
    }

    let body_limit = state.config.max_body_size;
    let cors = cors_layer(&state.config.cors_origins);

    router
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(from_fn(metrics_middleware))
        // request_id runs first so the access log can read the id
        .layer(from_fn(request_logging))
        .layer(from_fn(request_id))
        .layer(cors)
        .with_state(state)
}
