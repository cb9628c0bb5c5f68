//! Per-job temporary workspaces.
//!
//! Each export job gets a fresh directory for its intermediate clips, the
//! concat manifest and the rendered output. The directory is removed when the
//! job ends, whatever the outcome.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use reel_models::JobId;
use tracing::{debug, warn};

use crate::error::WorkerResult;

const MANIFEST_FILE: &str = "concat_list.txt";
const OUTPUT_FILE: &str = "export.mp4";

/// Scratch directory exclusively owned by one export job.
#[derive(Debug, Clone)]
pub struct Workspace {
    job_id: JobId,
    dir: PathBuf,
}

impl Workspace {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the intermediate file for the clip at `index`.
    ///
    /// The index prefix keeps names unique even if clip ids repeat.
    pub fn clip_output_path(&self, index: usize, clip_id: &str) -> PathBuf {
        self.dir
            .join(format!("clip_{:03}_{}.mp4", index, sanitize(clip_id)))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILE)
    }
}

pub(crate) fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Allocates and tears down [`Workspace`]s under one root.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh, empty directory for `job_id`.
    ///
    /// Fails rather than reuse an existing directory.
    pub async fn allocate(&self, job_id: &JobId) -> WorkerResult<Workspace> {
        tokio::fs::create_dir_all(&self.root).await?;

        let dir = self
            .root
            .join(format!("{}-{}", sanitize(job_id.as_str()), uuid::Uuid::new_v4().simple()));
        tokio::fs::create_dir(&dir).await?;

        debug!(job_id = %job_id, dir = %dir.display(), "Allocated workspace");

        Ok(Workspace {
            job_id: job_id.clone(),
            dir,
        })
    }

    /// Write the concat manifest listing `ordered_paths` in order.
    pub async fn write_manifest(
        &self,
        workspace: &Workspace,
        ordered_paths: &[PathBuf],
    ) -> WorkerResult<PathBuf> {
        let path = workspace.manifest_path();
        tokio::fs::write(&path, reel_media::render_manifest(ordered_paths)).await?;
        Ok(path)
    }

    /// Remove the workspace directory.
    ///
    /// Idempotent. Errors are logged and swallowed so teardown never masks
    /// the job's own outcome.
    pub async fn release(&self, workspace: &Workspace) {
        match tokio::fs::remove_dir_all(&workspace.dir).await {
            Ok(()) => {
                debug!(job_id = %workspace.job_id, "Released workspace");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    job_id = %workspace.job_id,
                    dir = %workspace.dir.display(),
                    "Failed to remove workspace: {}", e
                );
            }
        }
    }
}
