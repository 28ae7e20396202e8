//! Shared data models for the FaceGate backend.
//!
//! This crate provides Serde-serializable types for:
//! - Cameras and their stream sources
//! - Face detections (bounding box, keypoints, confidence, direction)
//! - Broadcast event payloads carried to live subscribers

pub mod camera;
pub mod detection;
pub mod event;

// Re-export common types
pub use camera::{Camera, CameraId, CameraKind};
pub use detection::{
    BoundingBox, DetectionId, DetectionRecord, Direction, Keypoint, NewDetection,
};
pub use event::{CameraErrorKind, CameraEvent};
