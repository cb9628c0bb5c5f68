//! Worker error types.

use std::sync::Arc;
use std::time::Duration;

use reel_media::MediaError;
use reel_remote::RemoteError;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{}", processing_message(.clip_id, .message))]
    Processing {
        clip_id: Option<String>,
        message: String,
    },

    #[error("Remote service returned {status}: {body}")]
    RemoteService { status: u16, body: String },

    #[error("Remote service timed out after {0:?}")]
    ServiceTimeout(Duration),

    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Remote error: {0}")]
    Remote(RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One failure handed to every caller of a shared single-flight execution.
    #[error("{0}")]
    Shared(Arc<WorkerError>),
}

fn processing_message(clip_id: &Option<String>, message: &str) -> String {
    match clip_id {
        Some(id) => format!("Processing failed for clip {}: {}", id, message),
        None => format!("Processing failed: {}", message),
    }
}

impl From<RemoteError> for WorkerError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Timeout(limit) => WorkerError::ServiceTimeout(limit),
            RemoteError::ServiceError { status, body } => {
                WorkerError::RemoteService { status, body }
            }
            RemoteError::NotFound(_) => WorkerError::NotFound("Remote job not found".to_string()),
            other => WorkerError::Remote(other),
        }
    }
}

impl From<Arc<WorkerError>> for WorkerError {
    fn from(err: Arc<WorkerError>) -> Self {
        WorkerError::Shared(err)
    }
}

impl WorkerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Processing failure attributed to one clip.
    pub fn clip_failed(clip_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Processing {
            clip_id: Some(clip_id.into()),
            message: msg.into(),
        }
    }

    /// Processing failure not tied to a single clip (concatenation, placement).
    pub fn processing_failed(msg: impl Into<String>) -> Self {
        Self::Processing {
            clip_id: None,
            message: msg.into(),
        }
    }

    pub fn ingestion(msg: impl Into<String>) -> Self {
        Self::Ingestion(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// The underlying error, looking through shared single-flight wrappers.
    pub fn root(&self) -> &WorkerError {
        match self {
            WorkerError::Shared(inner) => inner.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), WorkerError::NotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), WorkerError::ServiceTimeout(_))
    }
}
