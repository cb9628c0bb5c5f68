//! Encoder settings shared by filtered cuts and the final concat pass.

use serde::{Deserialize, Serialize};

pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
pub const DEFAULT_PRESET: &str = "veryfast";
pub const DEFAULT_CRF: u8 = 23;
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Width thumbnails are scaled to; height follows the aspect ratio.
pub const THUMBNAIL_SCALE_WIDTH: u32 = 320;
pub const DEFAULT_THUMBNAIL_COUNT: u32 = 8;

/// `showwavespic` canvas.
pub const WAVEFORM_SIZE: &str = "1200x120";

/// Re-encode settings.
///
/// Only used when pixels change (a color filter) or when clips are joined;
/// unfiltered cuts are stream-copied and ignore this entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodingConfig {
    pub video_codec: String,
    pub preset: String,
    /// 0-51, lower is better
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Move the moov atom to the front so downloads start playing early
    pub faststart: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            faststart: true,
        }
    }
}

impl EncodingConfig {
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// FFmpeg output arguments for a full transcode.
    pub fn transcode_args(&self) -> Vec<String> {
        let pairs = [
            ("-c:v", self.video_codec.clone()),
            ("-preset", self.preset.clone()),
            ("-crf", self.crf.to_string()),
            ("-pix_fmt", "yuv420p".to_string()),
            ("-c:a", self.audio_codec.clone()),
            ("-b:a", self.audio_bitrate.clone()),
        ];
        let mut args: Vec<String> = pairs
            .into_iter()
            .flat_map(|(flag, value)| [flag.to_string(), value])
            .collect();
        if self.faststart {
            args.push("-movflags".to_string());
            args.push("+faststart".to_string());
        }
        args
    }
}
