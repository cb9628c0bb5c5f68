//! Media tool errors.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    /// `ffmpeg` or `ffprobe` is not installed
    #[error("{0} is not installed or not on PATH")]
    ToolMissing(&'static str),

    /// The tool ran and exited non-zero. `message` already carries the last
    /// stderr line, so it can be recorded on a job as-is.
    #[error("{tool}: {message}")]
    ToolFailed {
        tool: &'static str,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("ffmpeg killed after running for {0:?}")]
    Timeout(Duration),

    #[error("no such media file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unusable media: {0}")]
    InvalidVideo(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unreadable ffprobe output: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::tool_failed("ffmpeg", message, stderr, exit_code)
    }

    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::tool_failed("ffprobe", message, stderr, None)
    }

    fn tool_failed(
        tool: &'static str,
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        let mut message = message.into();
        if let Some(last) = stderr.as_deref().and_then(last_meaningful_line) {
            message = format!("{} ({})", message, last);
        }
        Self::ToolFailed {
            tool,
            message,
            stderr,
            exit_code,
        }
    }

    /// Exit code of a failed tool run, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ToolFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn last_meaningful_line(stderr: &str) -> Option<&str> {
    stderr.lines().rev().map(str::trim).find(|l| !l.is_empty())
}
