//! Shared data models for the Reelsmith backend.
//!
//! This crate provides Serde-serializable types for:
//! - Export projects, clips and color filters
//! - Export job records and their status
//! - Remote compute job records and the remote status vocabulary
//! - Ingested media assets
//! - Encoding configuration

pub mod asset;
pub mod clip;
pub mod encoding;
pub mod job;
pub mod job_status;
pub mod remote;

// Re-export common types
pub use asset::{media_type_for_extension, IngestedAsset};
pub use clip::{ClipDescriptor, ClipFilter, ProjectDescriptor};
pub use encoding::EncodingConfig;
pub use job::{ExportJob, JobId};
pub use job_status::{ExportStatus, RemoteJobStatus};
pub use remote::ExternalComputeJob;
