//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use reel_models::encoding::DEFAULT_THUMBNAIL_COUNT;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root of managed storage
    pub storage_root: PathBuf,
    /// Parent directory of per-job temp workspaces
    pub work_dir: PathBuf,
    /// Thumbnails produced when a caller does not ask for a count
    pub thumbnail_count: u32,
    /// Delete a remote job's output after it has been ingested
    pub remote_output_cleanup: bool,
    /// Upper bound on a single FFmpeg invocation
    pub ffmpeg_timeout: Option<Duration>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./storage"),
            work_dir: default_work_dir(),
            thumbnail_count: DEFAULT_THUMBNAIL_COUNT,
            remote_output_cleanup: false,
            ffmpeg_timeout: None,
        }
    }
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("reel-exports")
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            storage_root: std::env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./storage")),
            work_dir: std::env::var("WORKER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_work_dir()),
            thumbnail_count: std::env::var("THUMBNAIL_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_THUMBNAIL_COUNT),
            remote_output_cleanup: std::env::var("REMOTE_OUTPUT_CLEANUP")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            ffmpeg_timeout: std::env::var("FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
        }
    }

    /// Config rooted at `root`, with workspaces under `root/work`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            work_dir: root.join("work"),
            storage_root: root,
            ..Self::default()
        }
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.storage_root.join("uploads")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.storage_root.join("exports")
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.storage_root.join("thumbnails")
    }

    pub fn waveforms_dir(&self) -> PathBuf {
        self.storage_root.join("waveforms")
    }

    /// Create every managed storage directory.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            self.uploads_dir(),
            self.exports_dir(),
            self.thumbnails_dir(),
            self.waveforms_dir(),
            self.work_dir.clone(),
        ] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }
}
