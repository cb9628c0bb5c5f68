//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reel_models::ExportStatus;
use reel_worker::WorkerError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Export not ready")]
    ExportNotReady { status: ExportStatus },

    #[error("Remote service returned {status}")]
    RemoteService { status: u16, body: String },

    #[error("{0}")]
    ServiceTimeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) | ApiError::ExportNotReady { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::RemoteService { .. } => StatusCode::BAD_GATEWAY,
            ApiError::ServiceTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WorkerError> for ApiError {
    fn from(err: WorkerError) -> Self {
        match err.root() {
            WorkerError::Validation(_) => ApiError::Validation(err.root().to_string()),
            WorkerError::NotFound(msg) => ApiError::NotFound(msg.clone()),
            WorkerError::RemoteService { status, body } => ApiError::RemoteService {
                status: *status,
                body: body.clone(),
            },
            WorkerError::ServiceTimeout(_) => ApiError::ServiceTimeout(err.root().to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();

        let body = match &self {
            ApiError::ExportNotReady { status } => ErrorResponse {
                error: self.to_string(),
                status: Some(Value::String(status.as_str().to_string())),
                detail: None,
            },
            ApiError::RemoteService { status, body } => ErrorResponse {
                error: self.to_string(),
                status: Some(Value::from(*status)),
                detail: Some(body.clone()),
            },
            // Don't expose internal error details in production
            ApiError::Internal(_) => {
                let error = if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                };
                ErrorResponse {
                    error,
                    status: None,
                    detail: None,
                }
            }
            _ => ErrorResponse {
                error: self.to_string(),
                status: None,
                detail: None,
            },
        };

        (code, Json(body)).into_response()
    }
}
