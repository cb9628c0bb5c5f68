//! Export job records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::job_status::ExportStatus;

/// Opaque export job id, a v4 UUID unless supplied by a test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of one multi-clip export.
///
/// Once `completed` or `failed` the record is frozen: every mutator below
/// is a no-op on a terminal job and reports whether it applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub id: JobId,
    pub status: ExportStatus,
    /// Percent, 0-100
    pub progress: u8,
    pub clip_count: usize,
    /// Path of the final deliverable once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_ref: Option<String>,
    /// Failure reason, verbatim from the failing stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
}

impl ExportJob {
    /// A freshly accepted job, `processing` at 0%.
    pub fn new(id: JobId, clip_count: usize) -> Self {
        Self {
            id,
            status: ExportStatus::Processing,
            progress: 0,
            clip_count,
            output_ref: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
            failed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply `change` unless the job already finished.
    fn unless_terminal(&mut self, change: impl FnOnce(&mut Self)) -> bool {
        if self.is_terminal() {
            return false;
        }
        change(self);
        true
    }

    /// Progress only rises, and stays below 100 until [`complete`](Self::complete).
    pub fn set_progress(&mut self, progress: u8) -> bool {
        self.unless_terminal(|job| job.progress = job.progress.max(progress.min(99)))
    }

    pub fn complete(&mut self, output_ref: impl Into<String>) -> bool {
        let output_ref = output_ref.into();
        self.unless_terminal(|job| {
            job.status = ExportStatus::Completed;
            job.progress = 100;
            job.output_ref = Some(output_ref);
            job.completed_at = Some(Utc::now());
        })
    }

    /// Record `error` verbatim as the failure reason.
    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        let error = error.into();
        self.unless_terminal(|job| {
            job.status = ExportStatus::Failed;
            job.error = Some(error);
            job.failed_at = Some(Utc::now());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
        assert_eq!(JobId::from_string("x").to_string(), "x");
    }

    #[test]
    fn test_export_job_completion() {
        let mut job = ExportJob::new(JobId::new(), 2);
        assert_eq!(job.status, ExportStatus::Processing);

        assert!(job.set_progress(45));
        assert_eq!(job.progress, 45);

        assert!(job.complete("/exports/out.mp4"));
        assert_eq!(job.status, ExportStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.completed_at.is_some());
        assert_eq!(job.output_ref.as_deref(), Some("/exports/out.mp4"));
    }

    #[test]
    fn test_terminal_job_is_frozen() {
        let mut job = ExportJob::new(JobId::new(), 1);
        assert!(job.fail("concat failed"));
        assert!(!job.complete("/exports/out.mp4"));
        assert!(!job.set_progress(80));
        assert!(!job.fail("again"));

        assert_eq!(job.status, ExportStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("concat failed"));
        assert!(job.output_ref.is_none());
        assert!(job.failed_at.is_some());
    }

    #[test]
    fn test_progress_is_monotonic_and_capped() {
        let mut job = ExportJob::new(JobId::new(), 3);
        job.set_progress(60);
        job.set_progress(30);
        assert_eq!(job.progress, 60);
        job.set_progress(100);
        assert_eq!(job.progress, 99);
    }

    #[test]
    fn test_export_job_json_shape() {
        let job = ExportJob::new(JobId::from_string("job-1"), 1);
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["id"], "job-1");
        assert_eq!(json["status"], "processing");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("outputRef").is_none());
    }
}
