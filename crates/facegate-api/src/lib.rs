//! Axum HTTP/WS admin server.
//!
//! This crate provides:
//! - Camera registry endpoints and per-camera start/stop control
//! - A WebSocket feed of lifecycle and detection events
//! - Recent-detection history from the in-memory store
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod stores;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use stores::{FileCameraDirectory, RingDetectionStore};
