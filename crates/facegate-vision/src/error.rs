//! Error types for vision operations.

use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while sourcing frames or detecting faces.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("invalid source locator: {0}")]
    InvalidLocator(String),

    #[error("detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("detection failed: {0}")]
    DetectionFailed(String),

    #[error("encode failed: {0}")]
    EncodeFailed(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VisionError {
    /// Create a source unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable(message.into())
    }

    /// Create a detector unavailable error.
    pub fn detector_unavailable(message: impl Into<String>) -> Self {
        Self::DetectorUnavailable(message.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Whether this error makes the detector unusable for every camera
    /// sharing it, as opposed to failing a single call.
    pub fn is_detector_fatal(&self) -> bool {
        matches!(self, Self::DetectorUnavailable(_))
    }
}
