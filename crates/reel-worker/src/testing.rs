//! In-process [`MediaTool`] double for orchestration tests.
//!
//! Writes small placeholder files instead of running FFmpeg and records every
//! call so tests can assert ordering and call counts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reel_media::{parse_manifest, thumbnail_file_name, MediaError, MediaResult, MediaTool, VideoInfo};
use reel_models::ClipFilter;

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Probe(PathBuf),
    Cut {
        input: PathBuf,
        output: PathBuf,
        start: f64,
        duration: f64,
        filter: ClipFilter,
    },
    Concat {
        manifest_entries: Vec<PathBuf>,
        output: PathBuf,
    },
    Screenshots {
        input: PathBuf,
        count: u32,
    },
    Waveform {
        input: PathBuf,
    },
}

#[derive(Debug, Default)]
pub struct FakeMediaTool {
    calls: Mutex<Vec<MediaCall>>,
    delay: Option<Duration>,
    /// Extra latency for cuts whose output name contains the pattern
    cut_delays: Vec<(String, Duration)>,
    fail_cut_on: Option<String>,
    fail_concat: AtomicBool,
    fail_probe: AtomicBool,
    fail_screenshots_after: Option<u32>,
    fail_waveform: AtomicBool,
    probe_duration: Mutex<f64>,
    screenshot_runs: AtomicU32,
    waveform_runs: AtomicU32,
}

impl FakeMediaTool {
    pub fn new() -> Self {
        Self {
            probe_duration: Mutex::new(7.0),
            ..Self::default()
        }
    }

    /// Sleep this long inside every operation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_cut_delay(mut self, output_contains: &str, delay: Duration) -> Self {
        self.cut_delays.push((output_contains.to_string(), delay));
        self
    }

    /// Fail cuts whose output file name contains `pattern`.
    pub fn fail_cut_on(mut self, pattern: &str) -> Self {
        self.fail_cut_on = Some(pattern.to_string());
        self
    }

    /// Write `n` thumbnails, then fail.
    pub fn fail_screenshots_after(mut self, n: u32) -> Self {
        self.fail_screenshots_after = Some(n);
        self
    }

    pub fn set_fail_concat(&self, fail: bool) {
        self.fail_concat.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_probe(&self, fail: bool) {
        self.fail_probe.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_waveform(&self, fail: bool) {
        self.fail_waveform.store(fail, Ordering::SeqCst);
    }

    pub fn set_probe_duration(&self, duration: f64) {
        if let Ok(mut d) = self.probe_duration.lock() {
            *d = duration;
        }
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn cut_calls(&self) -> Vec<MediaCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, MediaCall::Cut { .. }))
            .collect()
    }

    pub fn probe_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MediaCall::Probe(_)))
            .count()
    }

    /// Manifest entries of the last concat call.
    pub fn last_concat_entries(&self) -> Option<Vec<PathBuf>> {
        self.calls().into_iter().rev().find_map(|c| match c {
            MediaCall::Concat {
                manifest_entries, ..
            } => Some(manifest_entries),
            _ => None,
        })
    }

    pub fn screenshot_runs(&self) -> u32 {
        self.screenshot_runs.load(Ordering::SeqCst)
    }

    pub fn waveform_runs(&self) -> u32 {
        self.waveform_runs.load(Ordering::SeqCst)
    }

    fn record(&self, call: MediaCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MediaTool for FakeMediaTool {
    async fn probe(&self, path: &Path) -> MediaResult<VideoInfo> {
        self.record(MediaCall::Probe(path.to_path_buf()));
        self.pause().await;

        if self.fail_probe.load(Ordering::SeqCst) {
            return Err(MediaError::ffprobe_failed(
                "invalid data found when processing input",
                None,
            ));
        }
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| MediaError::FileNotFound(path.to_path_buf()))?;
        let duration = self.probe_duration.lock().map(|d| *d).unwrap_or(7.0);

        Ok(VideoInfo {
            duration,
            width: 1280,
            height: 720,
            fps: 30.0,
            codec: "h264".to_string(),
            audio_codec: Some("aac".to_string()),
            size: metadata.len(),
            bitrate: 0,
        })
    }

    async fn cut(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        duration: f64,
        filter: ClipFilter,
    ) -> MediaResult<()> {
        self.record(MediaCall::Cut {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            start,
            duration,
            filter,
        });
        self.pause().await;

        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        for (pattern, delay) in &self.cut_delays {
            if name.contains(pattern.as_str()) {
                tokio::time::sleep(*delay).await;
            }
        }
        if let Some(pattern) = &self.fail_cut_on {
            if name.contains(pattern.as_str()) {
                return Err(MediaError::ffmpeg_failed(
                    "exit status 1",
                    Some("Invalid argument".to_string()),
                    Some(1),
                ));
            }
        }
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        let body = format!("cut {} {:.3} {:.3} {}\n", name, start, duration, filter);
        tokio::fs::write(output, body).await?;
        Ok(())
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> MediaResult<()> {
        let text = tokio::fs::read_to_string(manifest).await?;
        let entries = parse_manifest(&text);
        self.record(MediaCall::Concat {
            manifest_entries: entries.clone(),
            output: output.to_path_buf(),
        });
        self.pause().await;

        if self.fail_concat.load(Ordering::SeqCst) {
            return Err(MediaError::ffmpeg_failed(
                "exit status 1",
                Some("Error while opening encoder".to_string()),
                Some(1),
            ));
        }

        let mut joined = Vec::new();
        for entry in &entries {
            joined.extend(tokio::fs::read(entry).await?);
        }
        tokio::fs::write(output, joined).await?;
        Ok(())
    }

    async fn screenshots(
        &self,
        input: &Path,
        output_dir: &Path,
        count: u32,
    ) -> MediaResult<Vec<PathBuf>> {
        self.record(MediaCall::Screenshots {
            input: input.to_path_buf(),
            count,
        });
        self.screenshot_runs.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        tokio::fs::create_dir_all(output_dir).await?;
        let mut produced = Vec::new();
        for index in 0..count {
            if self.fail_screenshots_after == Some(index) {
                return Err(MediaError::ffmpeg_failed(
                    "exit status 1",
                    Some("Output file is empty".to_string()),
                    Some(1),
                ));
            }
            let path = output_dir.join(thumbnail_file_name(index));
            tokio::fs::write(&path, b"jpeg").await?;
            produced.push(path);
        }
        Ok(produced)
    }

    async fn waveform(&self, input: &Path, output: &Path) -> MediaResult<()> {
        self.record(MediaCall::Waveform {
            input: input.to_path_buf(),
        });
        self.waveform_runs.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if self.fail_waveform.load(Ordering::SeqCst) {
            return Err(MediaError::ffmpeg_failed(
                "exit status 1",
                Some("Stream specifier ':a' matches no streams".to_string()),
                Some(1),
            ));
        }
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, b"png").await?;
        Ok(())
    }
}
