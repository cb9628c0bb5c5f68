//! Job status vocabularies.
//!
//! Export jobs are driven locally and only ever move forward:
//! `processing -> completed | failed`. Remote compute jobs report their own
//! status labels; [`RemoteJobStatus`] folds those labels into four states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Export job processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// Clips are being transformed or concatenated
    #[default]
    Processing,
    /// Final deliverable is available
    Completed,
    /// A stage failed; the reason is recorded on the job
    Failed,
}

impl ExportStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Processing => "processing",
            ExportStatus::Completed => "completed",
            ExportStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportStatus::Completed | ExportStatus::Failed)
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a job running on a remote compute service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemoteJobStatus {
    /// Accepted but not started
    #[default]
    Queued,
    /// Running (model loading, frame processing, encoding, ...)
    Processing,
    /// Finished; a result may be attached
    Completed,
    /// Finished with an error
    Failed,
}

impl RemoteJobStatus {
    /// Fold a remote status label into a status.
    ///
    /// Remote services report fine-grained in-flight labels such as
    /// `loading_model` or `encoding`; all of them count as processing.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "queued" | "starting" | "pending" => RemoteJobStatus::Queued,
            "completed" | "done" => RemoteJobStatus::Completed,
            "failed" | "error" => RemoteJobStatus::Failed,
            _ => RemoteJobStatus::Processing,
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteJobStatus::Queued => "queued",
            RemoteJobStatus::Processing => "processing",
            RemoteJobStatus::Completed => "completed",
            RemoteJobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RemoteJobStatus::Completed | RemoteJobStatus::Failed)
    }
}

impl fmt::Display for RemoteJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
