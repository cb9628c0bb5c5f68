//! Media metadata via `ffprobe`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::str::FromStr;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// What ingestion and thumbnailing need to know about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Seconds
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Video stream codec name
    pub codec: String,
    pub audio_codec: Option<String>,
    /// Bytes
    pub size: u64,
    /// Bits per second
    pub bitrate: u64,
}

impl VideoInfo {
    /// `"<width>x<height>"`
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

const SHOW_ENTRIES: &str = "format=duration,size,bit_rate:\
stream=codec_type,codec_name,width,height,avg_frame_rate,r_frame_rate";

/// Fallback when a stream reports no usable frame rate.
const DEFAULT_FPS: f64 = 30.0;

#[derive(Debug, Default, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    format: FormatSection,
    #[serde(default)]
    streams: Vec<StreamSection>,
}

// ffprobe reports format numbers as strings.
#[derive(Debug, Default, Deserialize)]
struct FormatSection {
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamSection {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
}

impl StreamSection {
    fn fps(&self) -> Option<f64> {
        [&self.avg_frame_rate, &self.r_frame_rate]
            .into_iter()
            .flatten()
            .find_map(|rate| parse_frame_rate(rate))
    }
}

impl ProbeReport {
    fn first_stream(&self, kind: &str) -> Option<&StreamSection> {
        self.streams.iter().find(|s| s.codec_type == kind)
    }

    fn into_video_info(self) -> MediaResult<VideoInfo> {
        let video = self
            .first_stream("video")
            .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

        Ok(VideoInfo {
            duration: number(&self.format.duration).unwrap_or(0.0),
            width: video.width.unwrap_or_default(),
            height: video.height.unwrap_or_default(),
            fps: video.fps().unwrap_or(DEFAULT_FPS),
            codec: video.codec_name.clone().unwrap_or_default(),
            audio_codec: self
                .first_stream("audio")
                .and_then(|audio| audio.codec_name.clone()),
            size: number(&self.format.size).unwrap_or(0),
            bitrate: number(&self.format.bit_rate).unwrap_or(0),
        })
    }
}

fn number<T: FromStr>(raw: &Option<String>) -> Option<T> {
    raw.as_deref().and_then(|s| s.trim().parse().ok())
}

/// Read the metadata of the file at `path`.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();
    if tokio::fs::metadata(path).await.is_err() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let program = check_ffprobe()?;
    let output = Command::new(program)
        .args(["-v", "error", "-of", "json", "-show_entries", SHOW_ENTRIES])
        .arg(path)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(MediaError::ffprobe_failed(
            format!("cannot read {}", path.display()),
            Some(stderr),
        ));
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(stdout: &[u8]) -> MediaResult<VideoInfo> {
    serde_json::from_slice::<ProbeReport>(stdout)?.into_video_info()
}

/// `"30000/1001"` or `"29.97"`; `None` for `"0/0"` and garbage.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = match rate.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.parse::<f64>().ok()? / den
        }
        None => rate.parse().ok()?,
    };
    (fps > 0.0).then_some(fps)
}
