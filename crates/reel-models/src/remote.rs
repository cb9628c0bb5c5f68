//! Remote compute job records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job_status::RemoteJobStatus;

/// A unit of work delegated to a remote compute service.
///
/// Status only changes when the remote service reports a new one, and
/// never after it reached `completed` or `failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalComputeJob {
    /// Job identifier shared with the remote service
    pub job_id: String,
    /// Capability name (`enhance`, `swap`, `track`, `generate`)
    pub capability: String,
    /// When the job was submitted
    pub requested_at: DateTime<Utc>,
    /// Last status observed from the remote
    pub last_known_status: RemoteJobStatus,
    /// Last full payload reported by the remote
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<serde_json::Value>,
}

impl ExternalComputeJob {
    /// Create a record for a freshly submitted job.
    pub fn new(
        job_id: impl Into<String>,
        capability: impl Into<String>,
        status: RemoteJobStatus,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            capability: capability.into(),
            requested_at: Utc::now(),
            last_known_status: status,
            raw_result: None,
        }
    }

    /// Record a status observation. Returns `false` once the job is
    /// terminal: a completed or failed record is frozen.
    pub fn observe(&mut self, status: RemoteJobStatus, payload: serde_json::Value) -> bool {
        if self.last_known_status.is_terminal() {
            return false;
        }
        self.last_known_status = status;
        self.raw_result = Some(payload);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_updates_status() {
        let mut job = ExternalComputeJob::new("j1", "enhance", RemoteJobStatus::Queued);
        assert!(job.observe(
            RemoteJobStatus::Processing,
            serde_json::json!({"status": "encoding"}),
        ));
        assert_eq!(job.last_known_status, RemoteJobStatus::Processing);
        assert!(job.raw_result.is_some());
    }

    #[test]
    fn test_terminal_status_does_not_regress() {
        let mut job = ExternalComputeJob::new("j1", "enhance", RemoteJobStatus::Queued);
        job.observe(RemoteJobStatus::Completed, serde_json::json!({"status": "completed"}));
        job.observe(RemoteJobStatus::Processing, serde_json::json!({"status": "encoding"}));
        assert_eq!(job.last_known_status, RemoteJobStatus::Completed);
        assert_eq!(job.raw_result.unwrap()["status"], "completed");
    }

    #[test]
    fn test_terminal_status_is_frozen() {
        let mut job = ExternalComputeJob::new("j1", "enhance", RemoteJobStatus::Queued);
        assert!(job.observe(RemoteJobStatus::Completed, serde_json::json!({"status": "completed"})));
        assert!(!job.observe(RemoteJobStatus::Failed, serde_json::json!({"status": "failed"})));
        assert_eq!(job.last_known_status, RemoteJobStatus::Completed);
        assert_eq!(job.raw_result.unwrap()["status"], "completed");
    }
}
