//! The media tool seam.
//!
//! Orchestration code depends on [`MediaTool`] rather than on FFmpeg
//! directly, so pipelines can be driven by a fake in tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reel_models::{ClipFilter, EncodingConfig};

use crate::clip::cut_clip;
use crate::command::FfmpegRunner;
use crate::concat::concat_videos;
use crate::error::MediaResult;
use crate::probe::{probe_video, VideoInfo};
use crate::thumbnail::{generate_screenshots, generate_waveform};

/// Media operations needed by export, ingestion and derived artifacts.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Read duration, resolution and codec of a media file.
    async fn probe(&self, path: &Path) -> MediaResult<VideoInfo>;

    /// Cut `duration` seconds from `start` into `output`, applying `filter`.
    async fn cut(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        duration: f64,
        filter: ClipFilter,
    ) -> MediaResult<()>;

    /// Join the files listed in an ffconcat `manifest` into `output`.
    async fn concat(&self, manifest: &Path, output: &Path) -> MediaResult<()>;

    /// Write `count` thumbnails into `output_dir`, returning them in order.
    async fn screenshots(
        &self,
        input: &Path,
        output_dir: &Path,
        count: u32,
    ) -> MediaResult<Vec<PathBuf>>;

    /// Render the audio waveform of `input` to `output`.
    async fn waveform(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// [`MediaTool`] backed by the ffmpeg and ffprobe binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTool {
    encoding: EncodingConfig,
    runner: FfmpegRunner,
}

impl FfmpegTool {
    pub fn new(encoding: EncodingConfig) -> Self {
        Self {
            encoding,
            runner: FfmpegRunner::new(),
        }
    }

    /// Kill any single FFmpeg invocation running longer than `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.runner = self.runner.with_timeout(limit);
        self
    }

    pub fn encoding(&self) -> &EncodingConfig {
        &self.encoding
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    async fn probe(&self, path: &Path) -> MediaResult<VideoInfo> {
        probe_video(path).await
    }

    async fn cut(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        duration: f64,
        filter: ClipFilter,
    ) -> MediaResult<()> {
        cut_clip(
            &self.runner,
            input,
            output,
            start,
            duration,
            filter,
            &self.encoding,
        )
        .await
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> MediaResult<()> {
        concat_videos(&self.runner, manifest, output, &self.encoding).await
    }

    async fn screenshots(
        &self,
        input: &Path,
        output_dir: &Path,
        count: u32,
    ) -> MediaResult<Vec<PathBuf>> {
        let info = probe_video(input).await?;
        generate_screenshots(&self.runner, input, output_dir, info.duration, count).await
    }

    async fn waveform(&self, input: &Path, output: &Path) -> MediaResult<()> {
        generate_waveform(&self.runner, input, output).await
    }
}
