//! Derived artifacts: thumbnail strips and waveform images.
//!
//! Artifacts are produced on first request and reused from disk afterwards.
//! Production for one video runs through a [`SingleFlight`] so concurrent
//! requests never start the same FFmpeg work twice.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reel_media::{thumbnail_file_name, MediaTool};
use tracing::{info, warn};

use crate::assets::AssetRegistry;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::single_flight::SingleFlight;
use crate::workspace::sanitize;

/// Upper bound on thumbnails per request.
pub const MAX_THUMBNAIL_COUNT: u32 = 64;

pub struct DerivedArtifacts {
    media: Arc<dyn MediaTool>,
    assets: Arc<AssetRegistry>,
    thumbnails_dir: PathBuf,
    waveforms_dir: PathBuf,
    default_thumbnail_count: u32,
    thumbnail_flights: SingleFlight<Vec<PathBuf>, Arc<WorkerError>>,
    waveform_flights: SingleFlight<PathBuf, Arc<WorkerError>>,
}

impl DerivedArtifacts {
    pub fn new(media: Arc<dyn MediaTool>, assets: Arc<AssetRegistry>, config: &WorkerConfig) -> Self {
        Self {
            media,
            assets,
            thumbnails_dir: config.thumbnails_dir(),
            waveforms_dir: config.waveforms_dir(),
            default_thumbnail_count: config.thumbnail_count,
            thumbnail_flights: SingleFlight::new("thumbnails"),
            waveform_flights: SingleFlight::new("waveform"),
        }
    }

    fn thumbnail_root(&self, video_id: &str) -> PathBuf {
        self.thumbnails_dir.join(sanitize(video_id))
    }

    /// Each count is its own strip: timestamps depend on how many are taken.
    fn thumbnail_dir(&self, video_id: &str, count: u32) -> PathBuf {
        self.thumbnail_root(video_id).join(count.to_string())
    }

    fn waveform_path(&self, video_id: &str) -> PathBuf {
        self.waveforms_dir.join(format!("{}.png", sanitize(video_id)))
    }

    /// Thumbnails for `video_id`, producing them if they do not exist yet.
    pub async fn thumbnails(&self, video_id: &str, count: Option<u32>) -> WorkerResult<Vec<PathBuf>> {
        let count = count.unwrap_or(self.default_thumbnail_count);
        if count == 0 || count > MAX_THUMBNAIL_COUNT {
            return Err(WorkerError::validation(format!(
                "count must be between 1 and {}",
                MAX_THUMBNAIL_COUNT
            )));
        }

        let source = self.assets.resolve_path(video_id)?;
        let dir = self.thumbnail_dir(video_id, count);

        if let Some(existing) = existing_thumbnails(&dir, count).await {
            return Ok(existing);
        }

        let media = Arc::clone(&self.media);
        let key = format!("thumbnails:{}:{}", video_id, count);
        let video_id = video_id.to_string();

        self.thumbnail_flights
            .run_exclusive(&key, move || async move {
                info!(video_id = %video_id, count, "Generating thumbnails");
                match media.screenshots(&source, &dir, count).await {
                    Ok(paths) => Ok(paths),
                    Err(e) => {
                        remove_dir_quietly(&dir).await;
                        Err(Arc::new(WorkerError::from(e)))
                    }
                }
            })
            .await
            .map_err(WorkerError::from)
    }

    /// Waveform image for `video_id`, producing it if it does not exist yet.
    pub async fn waveform(&self, video_id: &str) -> WorkerResult<PathBuf> {
        let source = self.assets.resolve_path(video_id)?;
        let output = self.waveform_path(video_id);

        if tokio::fs::try_exists(&output).await.unwrap_or(false) {
            return Ok(output);
        }

        let media = Arc::clone(&self.media);
        let key = format!("waveform:{}", video_id);
        let video_id = video_id.to_string();

        self.waveform_flights
            .run_exclusive(&key, move || async move {
                info!(video_id = %video_id, "Rendering waveform");
                match media.waveform(&source, &output).await {
                    Ok(()) => Ok(output),
                    Err(e) => {
                        remove_file_quietly(&output).await;
                        Err(Arc::new(WorkerError::from(e)))
                    }
                }
            })
            .await
            .map_err(WorkerError::from)
    }

    /// Delete produced artifacts so the next request regenerates them.
    pub async fn invalidate(&self, video_id: &str) {
        remove_dir_quietly(&self.thumbnail_root(video_id)).await;
        remove_file_quietly(&self.waveform_path(video_id)).await;
    }
}

async fn existing_thumbnails(dir: &Path, count: u32) -> Option<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(count as usize);
    for index in 0..count {
        let path = dir.join(thumbnail_file_name(index));
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return None;
        }
        paths.push(path);
    }
    Some(paths)
}

async fn remove_dir_quietly(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(dir = %dir.display(), "Failed to remove artifact directory: {}", e);
        }
    }
}

async fn remove_file_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), "Failed to remove artifact: {}", e);
        }
    }
}
