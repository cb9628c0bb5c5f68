//! Remote client error types.

use std::time::Duration;
use thiserror::Error;

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote service timed out after {0:?}")]
    Timeout(Duration),

    #[error("Remote service returned {status}: {body}")]
    ServiceError { status: u16, body: String },

    #[error("Remote job not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RemoteError {
    /// Classify a transport error, surfacing elapsed deadlines as [`RemoteError::Timeout`].
    pub fn from_transport(err: reqwest::Error, limit: Duration) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout(limit)
        } else {
            RemoteError::Network(err)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Timeout(_))
    }
}
