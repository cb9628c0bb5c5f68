use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrics::counter;
use reel_media::MediaTool;
use reel_models::ClipDescriptor;

use crate::error::{WorkerError, WorkerResult};

/// Turns one clip descriptor into one intermediate file.
#[derive(Clone)]
pub struct ClipTransformStage {
    media: Arc<dyn MediaTool>,
}

impl ClipTransformStage {
    pub fn new(media: Arc<dyn MediaTool>) -> Self {
        Self { media }
    }

    /// Cut `clip` into `output`.
    ///
    /// Unfiltered clips are stream-copied; filtered clips are re-encoded with
    /// the filter applied. Fails with a processing error naming the clip when
    /// the range is empty or inverted, or when the media tool fails.
    pub async fn transform(&self, clip: &ClipDescriptor, output: &Path) -> WorkerResult<PathBuf> {
        let duration = match clip.duration() {
            Some(d) if d > 0.0 => d,
            Some(_) => {
                return Err(WorkerError::clip_failed(
                    &clip.id,
                    "trimEnd must be greater than trimStart",
                ))
            }
            None => {
                return Err(WorkerError::clip_failed(
                    &clip.id,
                    "clip has neither trimEnd nor endTime",
                ))
            }
        };

        let path = if clip.filter.requires_reencode() {
            "filter"
        } else {
            "copy"
        };

        tracing::debug!(
            clip_id = %clip.id,
            start = clip.trim_start,
            duration = duration,
            filter = %clip.filter,
            path = path,
            "Transforming clip"
        );

        self.media
            .cut(
                Path::new(&clip.source_path),
                output,
                clip.trim_start,
                duration,
                clip.filter,
            )
            .await
            .map_err(|e| WorkerError::clip_failed(&clip.id, e.to_string()))?;

        counter!("reel_clip_transforms_total", "path" => path).increment(1);

        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMediaTool, MediaCall};
    use reel_models::ClipFilter;
    use tempfile::TempDir;

    fn clip(id: &str, source: &Path, start: f64, end: f64, filter: ClipFilter) -> ClipDescriptor {
        ClipDescriptor {
            id: id.to_string(),
            source_path: source.to_string_lossy().to_string(),
            trim_start: start,
            trim_end: Some(end),
            end_time: None,
            filter,
        }
    }

    #[tokio::test]
    async fn test_transform_passes_range_and_filter() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src.mp4");
        std::fs::write(&source, b"src").unwrap();
        let media = Arc::new(FakeMediaTool::new());
        let stage = ClipTransformStage::new(media.clone());

        let out = dir.path().join("clip_000_b.mp4");
        let result = stage
            .transform(&clip("b", &source, 2.0, 4.0, ClipFilter::Grayscale), &out)
            .await
            .unwrap();

        assert_eq!(result, out);
        assert!(out.exists());
        match &media.cut_calls()[0] {
            MediaCall::Cut {
                start,
                duration,
                filter,
                ..
            } => {
                assert_eq!(*start, 2.0);
                assert_eq!(*duration, 2.0);
                assert_eq!(*filter, ClipFilter::Grayscale);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_duration_rejected_before_media_tool() {
        let dir = TempDir::new().unwrap();
        let media = Arc::new(FakeMediaTool::new());
        let stage = ClipTransformStage::new(media.clone());

        let err = stage
            .transform(
                &clip("z", Path::new("/any.mp4"), 3.0, 3.0, ClipFilter::None),
                &dir.path().join("out.mp4"),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkerError::Processing { clip_id: Some(ref id), .. } if id == "z"
        ));
        assert!(media.calls().is_empty());
    }

    #[tokio::test]
    async fn test_media_failure_names_clip() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src.mp4");
        std::fs::write(&source, b"src").unwrap();
        let stage = ClipTransformStage::new(Arc::new(FakeMediaTool::new().fail_cut_on("bad")));

        let err = stage
            .transform(
                &clip("bad", &source, 0.0, 1.0, ClipFilter::Sepia),
                &dir.path().join("clip_000_bad.mp4"),
            )
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("clip bad"), "{message}");
        assert!(message.contains("Invalid argument"), "{message}");
    }
}
