//! Clip cutting.
//!
//! A clip without a color filter is cut with a stream copy (no re-encode);
//! a filtered clip is re-encoded with the filter applied during the cut.

use std::path::Path;
use tracing::info;

use reel_models::{ClipFilter, EncodingConfig};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters::build_video_filter;

/// Build the FFmpeg command for one clip cut.
pub fn build_cut_command(
    input: &Path,
    output: &Path,
    start_secs: f64,
    duration: f64,
    filter: ClipFilter,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    let cmd = FfmpegCommand::new(input, output)
        .seek(start_secs)
        .duration(duration);

    match build_video_filter(filter) {
        None => cmd.stream_copy(),
        Some(vf) => cmd.video_filter(vf).transcode(encoding),
    }
}

/// Cut `duration` seconds starting at `start_secs` from `input` into `output`.
pub async fn cut_clip(
    runner: &FfmpegRunner,
    input: &Path,
    output: &Path,
    start_secs: f64,
    duration: f64,
    filter: ClipFilter,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    info!(
        "Cutting clip: {} -> {} (start: {:.2}s, duration: {:.2}s, filter: {})",
        input.display(),
        output.display(),
        start_secs,
        duration,
        filter
    );

    let cmd = build_cut_command(input, output, start_secs, duration, filter, encoding);
    runner.run(&cmd).await
}
