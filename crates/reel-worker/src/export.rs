//! Export orchestration.
//!
//! `submit_export` validates a project synchronously, records a job and
//! spawns the pipeline. The background task transforms each clip in order,
//! concatenates the results, moves the deliverable into `exports/` and
//! always tears down the job's workspace.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrics::counter;
use reel_media::move_file;
use reel_models::{ExportJob, JobId, ProjectDescriptor};
use tokio::task::JoinHandle;
use tracing::Instrument;
use validator::Validate;

use crate::clip_pipeline::{ClipTransformStage, ConcatenationStage};
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLog;
use crate::store::JobStore;
use crate::workspace::{Workspace, WorkspaceManager};

/// Share of progress allotted to clip transforms; concat completes the rest.
const CLIP_PROGRESS_SPAN: f64 = 90.0;

/// Handle to an accepted export.
///
/// The job id is what callers poll with; the join handle lets tests (or a
/// shutdown path) wait for the background task.
#[derive(Debug)]
pub struct ExportTicket {
    pub job_id: JobId,
    pub handle: JoinHandle<()>,
}

pub struct ExportOrchestrator {
    jobs: Arc<dyn JobStore<ExportJob>>,
    workspaces: WorkspaceManager,
    clips: ClipTransformStage,
    concat: ConcatenationStage,
    exports_dir: PathBuf,
}

impl ExportOrchestrator {
    pub fn new(
        jobs: Arc<dyn JobStore<ExportJob>>,
        workspaces: WorkspaceManager,
        clips: ClipTransformStage,
        concat: ConcatenationStage,
        exports_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            jobs,
            workspaces,
            clips,
            concat,
            exports_dir: exports_dir.into(),
        }
    }

    /// Validate `project`, record a `processing` job and start it.
    ///
    /// Invalid projects are rejected here; no job or workspace is created.
    pub async fn submit_export(
        self: &Arc<Self>,
        project: ProjectDescriptor,
    ) -> WorkerResult<ExportTicket> {
        validate_project(&project).await?;

        let job_id = JobId::new();
        let job = ExportJob::new(job_id.clone(), project.clips.len());
        self.jobs.put(job_id.as_str(), job);
        counter!("reel_export_jobs_total", "outcome" => "submitted").increment(1);

        let logger = JobLog::new(job_id.as_str(), "export");
        logger.started(&format!(
            "{} clips, {:.1}s of footage",
            project.clips.len(),
            project.total_duration()
        ));

        let this = Arc::clone(self);
        let task_id = job_id.clone();
        let span = logger.span();
        let handle = tokio::spawn(
            async move {
                this.run(task_id, project, logger).await;
            }
            .instrument(span),
        );

        Ok(ExportTicket { job_id, handle })
    }

    /// Current record of an export job.
    pub fn get_status(&self, job_id: &str) -> WorkerResult<ExportJob> {
        self.jobs
            .get(job_id)
            .ok_or_else(|| WorkerError::not_found("Export job not found"))
    }

    async fn run(self: Arc<Self>, job_id: JobId, project: ProjectDescriptor, logger: JobLog) {
        let outcome = match self.workspaces.allocate(&job_id).await {
            Ok(workspace) => {
                // Run the stages on their own task so a panic still reaches
                // the release below.
                let this = Arc::clone(&self);
                let ws = workspace.clone();
                let stages_logger = logger.clone();
                let outcome = match tokio::spawn(async move {
                    this.process(&project, &ws, &stages_logger).await
                })
                .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => Err(WorkerError::processing_failed(format!(
                        "export task aborted: {}",
                        e
                    ))),
                };
                self.workspaces.release(&workspace).await;
                outcome
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(output) => {
                let output_ref = output.to_string_lossy().to_string();
                self.jobs.update(job_id.as_str(), &mut |job: &mut ExportJob| {
                    job.complete(output_ref.clone());
                });
                counter!("reel_export_jobs_total", "outcome" => "completed").increment(1);
                logger.finished(&output_ref);
            }
            Err(e) => {
                let reason = e.to_string();
                self.jobs.update(job_id.as_str(), &mut |job: &mut ExportJob| {
                    job.fail(reason.clone());
                });
                counter!("reel_export_jobs_total", "outcome" => "failed").increment(1);
                logger.failed(&reason);
            }
        }
    }

    async fn process(
        &self,
        project: &ProjectDescriptor,
        workspace: &Workspace,
        logger: &JobLog,
    ) -> WorkerResult<PathBuf> {
        let job_id = workspace.job_id();
        let total = project.clips.len();
        let mut intermediates = Vec::with_capacity(total);

        for (index, clip) in project.clips.iter().enumerate() {
            let output = workspace.clip_output_path(index, &clip.id);
            logger.clip(&clip.id, &format!("clip {}/{}", index + 1, total));
            self.clips.transform(clip, &output).await?;
            intermediates.push(output);

            let progress = clip_progress(index + 1, total);
            self.jobs.update(job_id.as_str(), &mut |job: &mut ExportJob| {
                job.set_progress(progress);
            });
            logger.progress(progress, &format!("clip {} done", clip.id));
        }

        let manifest = self.workspaces.write_manifest(workspace, &intermediates).await?;
        let rendered = self
            .concat
            .concatenate(&intermediates, &manifest, &workspace.output_path())
            .await?;

        let destination = self.exports_dir.join(format!("{}.mp4", job_id));
        move_file(&rendered, &destination).await.map_err(|e| {
            WorkerError::processing_failed(format!("could not store export: {}", e))
        })?;

        Ok(destination)
    }
}

fn clip_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (CLIP_PROGRESS_SPAN * done as f64 / total as f64).round() as u8
}

/// Reject empty projects and clips whose source is missing.
async fn validate_project(project: &ProjectDescriptor) -> WorkerResult<()> {
    project
        .validate()
        .map_err(|e| WorkerError::validation(e.to_string()))?;

    for clip in &project.clips {
        let source = Path::new(&clip.source_path);
        let readable = tokio::fs::metadata(source)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !readable {
            return Err(WorkerError::not_found(format!(
                "Source file not found for clip {}: {}",
                clip.id, clip.source_path
            )));
        }
    }
    Ok(())
}
