//! Job lifecycle logging.
//!
//! Every line emitted through a [`JobLog`] carries `job_id` and `op`
//! fields, so one job can be followed across the export pipeline, the
//! remote proxy and ingestion.

use tracing::{error, info, warn, Span};

/// Lifecycle logger bound to one job.
#[derive(Debug, Clone)]
pub struct JobLog {
    job_id: String,
    op: &'static str,
}

impl JobLog {
    /// `op` names the pipeline: `export`, `ingest` or a remote capability.
    pub fn new(job_id: impl Into<String>, op: &'static str) -> Self {
        Self {
            job_id: job_id.into(),
            op,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Span for the background task driving the job.
    pub fn span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, op = self.op)
    }

    pub fn started(&self, what: &str) {
        info!(job_id = %self.job_id, op = self.op, "started: {}", what);
    }

    pub fn progress(&self, percent: u8, what: &str) {
        info!(job_id = %self.job_id, op = self.op, progress = percent, "{}", what);
    }

    pub fn clip(&self, clip_id: &str, what: &str) {
        info!(job_id = %self.job_id, op = self.op, clip_id, "{}", what);
    }

    pub fn warn(&self, what: &str) {
        warn!(job_id = %self.job_id, op = self.op, "{}", what);
    }

    pub fn failed(&self, reason: &str) {
        error!(job_id = %self.job_id, op = self.op, "failed: {}", reason);
    }

    pub fn finished(&self, what: &str) {
        info!(job_id = %self.job_id, op = self.op, "finished: {}", what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::JobId;

    #[test]
    fn test_binds_job_and_op() {
        let id = JobId::new();
        let log = JobLog::new(id.as_str(), "export");
        assert_eq!(log.job_id(), id.as_str());
        assert_eq!(log.op(), "export");

        let remote = JobLog::new("enhance-123", "enhance");
        assert_eq!(remote.job_id(), "enhance-123");
    }
}
