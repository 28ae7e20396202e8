//! Engine error types.

use thiserror::Error;

use facegate_models::{CameraErrorKind, CameraId};
use facegate_vision::VisionError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the supervisor and its camera tasks.
///
/// Per-frame and per-detection failures are contained inside the
/// pipeline and never appear here; these are the failures that end a
/// `start` call or a whole camera task.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("camera not found: {0}")]
    CameraNotFound(CameraId),

    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("face detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("persist failed: {0}")]
    PersistFailed(String),
}

impl EngineError {
    /// Create a persist failure error.
    pub fn persist_failed(message: impl Into<String>) -> Self {
        Self::PersistFailed(message.into())
    }

    /// How a `cameraError` event for this failure should be classified:
    /// a broken shared detector is globally visible, everything else is
    /// scoped to one camera.
    pub fn error_kind(&self) -> CameraErrorKind {
        match self {
            EngineError::DetectorUnavailable(_) => CameraErrorKind::Detector,
            _ => CameraErrorKind::Source,
        }
    }
}

impl From<VisionError> for EngineError {
    fn from(e: VisionError) -> Self {
        match e {
            VisionError::DetectorUnavailable(msg) => EngineError::DetectorUnavailable(msg),
            other => EngineError::SourceUnavailable(other.to_string()),
        }
    }
}
