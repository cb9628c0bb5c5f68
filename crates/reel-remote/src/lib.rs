//! Client for the remote compute services.
//!
//! Each capability (enhance, swap, track, generate) is served by an external
//! HTTP service. Polled capabilities accept a job and expose a progress
//! endpoint; inline capabilities answer the trigger call with the final
//! result.

pub mod client;
pub mod error;
pub mod types;

pub use client::{RemoteClient, RemoteClientConfig};
pub use error::{RemoteError, RemoteResult};
pub use types::{Capability, ProgressMode};
