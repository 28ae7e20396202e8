//! Frame source and face detector capabilities.
//!
//! This crate provides:
//! - [`Frame`] and the [`FrameSource`]/[`SourceProvider`] seams
//! - The [`FaceDetector`] capability trait and [`SharedDetector`], a
//!   lazily-initialized serialization wrapper for detectors shared by
//!   many camera tasks
//! - Face crop + JPEG/base64 encoding
//!
//! Real RTSP decode and identity matching are out of scope; the
//! synthetic source and detector stand in for them.

pub mod detector;
pub mod encode;
pub mod error;
pub mod frame;
pub mod source;

pub use detector::{Face, FaceDetector, SharedDetector, SyntheticDetector, DEFAULT_CONFIDENCE};
pub use encode::encode_face;
pub use error::{VisionError, VisionResult};
pub use frame::Frame;
pub use source::{FrameSource, SourceProvider, SyntheticProvider, SyntheticSource};
