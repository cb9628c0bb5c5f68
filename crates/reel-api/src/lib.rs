//! Axum HTTP API server.
//!
//! This crate provides:
//! - Export submission, status and download routes
//! - Remote compute job submission and polling per capability
//! - Thumbnail and waveform routes for ingested videos
//! - Request logging and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
