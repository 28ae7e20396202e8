//! HTTP request handlers.

pub mod cameras;
pub mod detections;
pub mod health;

pub use health::health;
