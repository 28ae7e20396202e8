//! Collaborator contracts consumed by the engine.
//!
//! Camera lookup and detection persistence live outside the core; the
//! admin application wires in its own implementations.

use async_trait::async_trait;

use facegate_models::{Camera, CameraId, DetectionRecord, NewDetection};

use crate::error::EngineResult;

/// Resolves camera ids to registered cameras.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CameraDirectory: Send + Sync {
    /// Look up one camera. `Ok(None)` means the id is unknown.
    async fn get_camera(&self, id: &CameraId) -> EngineResult<Option<Camera>>;

    /// All registered cameras, used to bring active cameras up at boot.
    async fn list_cameras(&self) -> EngineResult<Vec<Camera>>;
}

/// Durably stores detection records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DetectionStore: Send + Sync {
    /// Persist one detection, assigning its id and timestamp.
    async fn create_detection(&self, detection: NewDetection) -> EngineResult<DetectionRecord>;
}
