//! Concatenation of intermediate clips.
//!
//! Inputs are listed in an ffconcat manifest and joined in one re-encode
//! pass, so the deliverable has a uniform codec regardless of whether each
//! clip was stream-copied or filtered upstream.

use std::path::{Path, PathBuf};
use tracing::info;

use reel_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Render an ffconcat manifest listing `paths` in order.
pub fn render_manifest(paths: &[PathBuf]) -> String {
    let mut manifest = String::from("ffconcat version 1.0\n");
    for path in paths {
        manifest.push_str("file '");
        manifest.push_str(&escape_manifest_path(path));
        manifest.push_str("'\n");
    }
    manifest
}

/// Parse the file entries back out of a manifest, in order.
pub fn parse_manifest(manifest: &str) -> Vec<PathBuf> {
    manifest
        .lines()
        .filter_map(|line| line.trim().strip_prefix("file "))
        .map(|quoted| {
            let inner = quoted
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(quoted);
            PathBuf::from(inner.replace("'\\''", "'"))
        })
        .collect()
}

/// Quote a path for a single-quoted manifest entry.
fn escape_manifest_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "'\\''")
}

/// Build the FFmpeg command joining the manifest into `output`.
pub fn build_concat_command(
    manifest: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(manifest, output)
        .concat_input()
        .transcode(encoding)
}

/// Join the clips listed in `manifest` into `output`.
pub async fn concat_videos(
    runner: &FfmpegRunner,
    manifest: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    info!(
        "Concatenating clips: {} -> {}",
        manifest.display(),
        output.display()
    );

    let cmd = build_concat_command(manifest, output, encoding);
    runner.run(&cmd).await
}
