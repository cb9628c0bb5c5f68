//! FFmpeg invocation.
//!
//! [`FfmpegCommand`] assembles one `ffmpeg` argument list; [`FfmpegRunner`]
//! executes it and turns a non-zero exit into [`MediaError::ToolFailed`]
//! carrying the tail of stderr.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use reel_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};

/// Stderr kept on a failure; ffmpeg puts the reason at the end.
const STDERR_TAIL_BYTES: usize = 8 * 1024;

/// Arguments for one `ffmpeg` run reading `input` and writing `output`.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    /// Placed before `-i` (seeking, demuxer selection)
    before_input: Vec<String>,
    /// Placed between `-i` and the output path
    after_input: Vec<String>,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            before_input: Vec::new(),
            after_input: Vec::new(),
        }
    }

    fn input_flag(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.before_input.push(flag.to_string());
        self.before_input.push(value.into());
        self
    }

    /// Append one output argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.after_input.push(arg.into());
        self
    }

    /// Append several output arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after_input.extend(args.into_iter().map(Into::into));
        self
    }

    /// Start reading at `start` seconds.
    ///
    /// Input-side seeking: fast, and snaps to the previous keyframe when
    /// stream-copying.
    pub fn seek(self, start: f64) -> Self {
        self.input_flag("-ss", format!("{:.3}", start))
    }

    /// Read at most `seconds` of input.
    pub fn duration(self, seconds: f64) -> Self {
        self.input_flag("-t", format!("{:.3}", seconds))
    }

    /// Treat the input as an ffconcat manifest of absolute paths.
    pub fn concat_input(self) -> Self {
        self.input_flag("-f", "concat").input_flag("-safe", "0")
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.arg("-vf").arg(filter)
    }

    pub fn filter_complex(self, graph: impl Into<String>) -> Self {
        self.arg("-filter_complex").arg(graph)
    }

    /// Remux without decoding.
    pub fn stream_copy(self) -> Self {
        self.args(["-c", "copy", "-avoid_negative_ts", "make_zero"])
    }

    /// Re-encode with `encoding`.
    pub fn transcode(self, encoding: &EncodingConfig) -> Self {
        self.args(encoding.transcode_args())
    }

    pub fn single_frame(self) -> Self {
        self.args(["-frames:v", "1"])
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Full argument list, without the program name.
    pub fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-nostdin", "-v", "error"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.extend(self.before_input.iter().cloned());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().into_owned());
        args.extend(self.after_input.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Executes [`FfmpegCommand`]s, optionally bounded in wall time.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any run that lasts longer than `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let program = check_ffmpeg()?;
        let args = cmd.build_args();
        debug!(output = %cmd.output_path().display(), "ffmpeg {}", args.join(" "));

        // Dropping the child on timeout kills it.
        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    warn!(output = %cmd.output_path().display(), "ffmpeg exceeded {:?}, killed", limit);
                    return Err(MediaError::Timeout(limit));
                }
            },
            None => child.wait_with_output().await?,
        };

        if output.status.success() {
            return Ok(());
        }
        Err(MediaError::ffmpeg_failed(
            format!("exit status {}", output.status),
            Some(stderr_tail(&output.stderr)),
            output.status.code(),
        ))
    }
}

fn stderr_tail(bytes: &[u8]) -> String {
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).into_owned()
}

/// Locate the `ffmpeg` binary.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::ToolMissing("ffmpeg"))
}

/// Locate the `ffprobe` binary.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::ToolMissing("ffprobe"))
}
