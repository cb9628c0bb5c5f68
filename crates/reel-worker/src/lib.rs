//! Orchestration layer for exports and remote compute jobs.
//!
//! This crate provides:
//! - Export orchestration over per-job temp workspaces
//! - Clip transform and concatenation stages
//! - A single-flight guard for derived artifacts and ingestion
//! - The external job proxy with its ingestion cache
//! - Pluggable job stores

pub mod artifacts;
pub mod assets;
pub mod clip_pipeline;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod proxy;
pub mod single_flight;
pub mod store;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use artifacts::DerivedArtifacts;
pub use assets::AssetRegistry;
pub use clip_pipeline::{ClipTransformStage, ConcatenationStage};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use export::{ExportOrchestrator, ExportTicket};
pub use logging::JobLog;
pub use proxy::{ExternalJobProxy, SubmittedJob};
pub use single_flight::SingleFlight;
pub use store::{JobStore, MemoryJobStore};
pub use workspace::{Workspace, WorkspaceManager};
