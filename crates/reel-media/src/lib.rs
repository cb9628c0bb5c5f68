#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the export and ingestion pipelines.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Clip cutting (stream copy or filtered re-encode)
//! - Manifest-driven concatenation
//! - Thumbnail strips and waveform images
//! - ffprobe metadata extraction
//! - The [`MediaTool`] trait the orchestration layer is written against

pub mod clip;
pub mod command;
pub mod concat;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod thumbnail;
pub mod tool;

pub use clip::cut_clip;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use concat::{concat_videos, parse_manifest, render_manifest};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{copy_file_atomic, move_file};
pub use probe::{probe_video, VideoInfo};
pub use thumbnail::{generate_screenshots, generate_thumbnail, generate_waveform, thumbnail_file_name};
pub use tool::{FfmpegTool, MediaTool};
