//! Remote compute job handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use reel_remote::{Capability, ProgressMode};
use reel_worker::ExternalJobProxy;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn resolve_proxy(state: &AppState, capability: &str) -> ApiResult<Arc<ExternalJobProxy>> {
    let capability: Capability = capability.parse().map_err(ApiError::not_found)?;
    state
        .proxy(capability)
        .ok_or_else(|| ApiError::not_found(format!("Capability {} is not configured", capability)))
}

/// Forward a job to the remote service for `capability`.
///
/// Polled capabilities answer `{jobId, status}`; inline ones answer with the
/// finished payload.
pub async fn submit_remote_job(
    State(state): State<AppState>,
    Path(capability): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let proxy = resolve_proxy(&state, &capability)?;
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let submitted = proxy.submit(body).await?;

    let response = match proxy.capability().progress_mode() {
        ProgressMode::Polled => json!({
            "jobId": submitted.job_id,
            "status": submitted.status,
        }),
        ProgressMode::Inline => submitted.payload,
    };
    Ok(Json(response))
}

pub async fn get_remote_job(
    State(state): State<AppState>,
    Path((capability, job_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let proxy = resolve_proxy(&state, &capability)?;
    Ok(Json(proxy.poll(&job_id).await?))
}
