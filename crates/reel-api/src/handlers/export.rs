//! Export handlers.

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Request};
use axum::response::Response;
use axum::Json;
use reel_models::{ExportJob, ExportStatus, ProjectDescriptor};
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitExportResponse {
    pub job_id: String,
    pub status: ExportStatus,
}

/// Accept a project and start exporting it in the background.
pub async fn submit_export(
    State(state): State<AppState>,
    payload: Result<Json<ProjectDescriptor>, JsonRejection>,
) -> ApiResult<Json<SubmitExportResponse>> {
    let Json(project) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    // The handle is only useful to tests; the job table tracks the outcome.
    let ticket = state.exports.submit_export(project).await?;
    info!(job_id = %ticket.job_id, "Export accepted");

    Ok(Json(SubmitExportResponse {
        job_id: ticket.job_id.to_string(),
        status: ExportStatus::Processing,
    }))
}

pub async fn get_export_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ExportJob>> {
    Ok(Json(state.exports.get_status(&job_id)?))
}

/// Stream the finished deliverable of a completed export.
pub async fn download_export(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    request: Request<Body>,
) -> ApiResult<Response> {
    let job = state.exports.get_status(&job_id)?;

    let output = match (job.status, job.output_ref.as_deref()) {
        (ExportStatus::Completed, Some(output)) => PathBuf::from(output),
        _ => return Err(ApiError::ExportNotReady { status: job.status }),
    };
    if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
        return Err(ApiError::ExportNotReady { status: job.status });
    }

    let response = ServeFile::new(&output)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    let mut response = response.map(Body::new);

    let disposition = format!("attachment; filename=\"export-{}.mp4\"", job_id);
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
