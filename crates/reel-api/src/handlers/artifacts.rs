//! Derived artifact handlers.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ThumbnailQuery {
    pub count: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailsResponse {
    pub video_id: String,
    pub thumbnails: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformResponse {
    pub video_id: String,
    pub waveform: String,
}

pub async fn get_thumbnails(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    query: Result<Query<ThumbnailQuery>, QueryRejection>,
) -> ApiResult<Json<ThumbnailsResponse>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let thumbnails = state.artifacts.thumbnails(&video_id, query.count).await?;

    Ok(Json(ThumbnailsResponse {
        video_id,
        thumbnails: thumbnails
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect(),
    }))
}

pub async fn get_waveform(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<WaveformResponse>> {
    let waveform = state.artifacts.waveform(&video_id).await?;

    Ok(Json(WaveformResponse {
        video_id,
        waveform: waveform.to_string_lossy().to_string(),
    }))
}
