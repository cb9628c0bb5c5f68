//! Thumbnail strips and waveform images.

use std::path::{Path, PathBuf};
use tracing::info;

use reel_models::encoding::{THUMBNAIL_SCALE_WIDTH, WAVEFORM_SIZE};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{filter_thumbnail, filter_waveform};

/// File name of the `index`-th thumbnail in a strip.
pub fn thumbnail_file_name(index: u32) -> String {
    format!("thumb_{}.jpg", index)
}

/// Timestamps for `count` thumbnails evenly spread over `duration`.
///
/// The first and last frames are skipped so black leaders and tails do not
/// end up in the strip.
pub fn thumbnail_timestamps(duration: f64, count: u32) -> Vec<f64> {
    if count == 0 || duration <= 0.0 {
        return Vec::new();
    }
    let step = duration / f64::from(count + 1);
    (1..=count).map(|i| step * f64::from(i)).collect()
}

/// Generate a single thumbnail at `at_secs`.
pub async fn generate_thumbnail(
    runner: &FfmpegRunner,
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    at_secs: f64,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(video_path.as_ref(), output_path.as_ref())
        .seek(at_secs)
        .single_frame()
        .video_filter(filter_thumbnail(THUMBNAIL_SCALE_WIDTH));

    runner.run(&cmd).await
}

/// Generate `count` thumbnails of a video of known `duration` into `output_dir`.
///
/// Returns the produced file paths in timeline order.
pub async fn generate_screenshots(
    runner: &FfmpegRunner,
    video_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    duration: f64,
    count: u32,
) -> MediaResult<Vec<PathBuf>> {
    let video_path = video_path.as_ref();
    let output_dir = output_dir.as_ref();

    let timestamps = thumbnail_timestamps(duration, count);
    if timestamps.is_empty() {
        return Err(MediaError::InvalidVideo(format!(
            "Cannot take {} thumbnails from a {:.2}s video",
            count, duration
        )));
    }

    tokio::fs::create_dir_all(output_dir).await?;

    info!(
        "Generating {} thumbnails for {} into {}",
        timestamps.len(),
        video_path.display(),
        output_dir.display()
    );

    let mut produced = Vec::with_capacity(timestamps.len());
    for (index, at) in (0u32..).zip(timestamps) {
        let output = output_dir.join(thumbnail_file_name(index));
        generate_thumbnail(runner, video_path, &output, at).await?;
        produced.push(output);
    }

    Ok(produced)
}

/// Build the FFmpeg command rendering an audio waveform image.
pub fn build_waveform_command(video_path: &Path, output_path: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video_path, output_path)
        .filter_complex(format!("[0:a]{}", filter_waveform(WAVEFORM_SIZE)))
        .single_frame()
}

/// Render the audio waveform of a video to a PNG.
pub async fn generate_waveform(
    runner: &FfmpegRunner,
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let video_path = video_path.as_ref();
    let output_path = output_path.as_ref();

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!(
        "Rendering waveform: {} -> {}",
        video_path.display(),
        output_path.display()
    );

    runner
        .run(&build_waveform_command(video_path, output_path))
        .await
}
