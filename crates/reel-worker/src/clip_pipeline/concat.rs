use std::path::{Path, PathBuf};
use std::sync::Arc;

use reel_media::MediaTool;

use crate::error::{WorkerError, WorkerResult};

/// Joins intermediate clips into the final deliverable.
#[derive(Clone)]
pub struct ConcatenationStage {
    media: Arc<dyn MediaTool>,
}

impl ConcatenationStage {
    pub fn new(media: Arc<dyn MediaTool>) -> Self {
        Self { media }
    }

    /// Concatenate the files listed in `manifest` into `output`.
    ///
    /// Every entry of `ordered_inputs` must exist before the media tool runs.
    pub async fn concatenate(
        &self,
        ordered_inputs: &[PathBuf],
        manifest: &Path,
        output: &Path,
    ) -> WorkerResult<PathBuf> {
        if ordered_inputs.is_empty() {
            return Err(WorkerError::processing_failed("nothing to concatenate"));
        }
        for input in ordered_inputs {
            if !tokio::fs::try_exists(input).await.unwrap_or(false) {
                return Err(WorkerError::processing_failed(format!(
                    "intermediate file missing: {}",
                    input.display()
                )));
            }
        }

        self.media
            .concat(manifest, output)
            .await
            .map_err(|e| WorkerError::processing_failed(format!("concatenation failed: {}", e)))?;

        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMediaTool;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_input_fails_without_media_call() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("a.mp4");
        std::fs::write(&present, b"a").unwrap();
        let media = Arc::new(FakeMediaTool::new());
        let stage = ConcatenationStage::new(media.clone());

        let err = stage
            .concatenate(
                &[present, dir.path().join("gone.mp4")],
                &dir.path().join("list.txt"),
                &dir.path().join("out.mp4"),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("gone.mp4"));
        assert!(media.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concatenate_joins_in_manifest_order() {
        let dir = TempDir::new().unwrap();
        let inputs: Vec<PathBuf> = ["one", "two"]
            .iter()
            .map(|name| {
                let p = dir.path().join(format!("{name}.mp4"));
                std::fs::write(&p, name.as_bytes()).unwrap();
                p
            })
            .collect();
        let manifest = dir.path().join("list.txt");
        std::fs::write(&manifest, reel_media::render_manifest(&inputs)).unwrap();

        let stage = ConcatenationStage::new(Arc::new(FakeMediaTool::new()));
        let out = stage
            .concatenate(&inputs, &manifest, &dir.path().join("out.mp4"))
            .await
            .unwrap();

        assert_eq!(std::fs::read(out).unwrap(), b"onetwo");
    }

    #[tokio::test]
    async fn test_media_failure_is_processing_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.mp4");
        std::fs::write(&input, b"a").unwrap();
        let manifest = dir.path().join("list.txt");
        std::fs::write(&manifest, reel_media::render_manifest(&[input.clone()])).unwrap();

        let media = Arc::new(FakeMediaTool::new());
        media.set_fail_concat(true);
        let stage = ConcatenationStage::new(media);

        let err = stage
            .concatenate(&[input], &manifest, &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Processing { clip_id: None, .. }));
    }
}
