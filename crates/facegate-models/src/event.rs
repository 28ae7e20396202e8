//! Broadcast event payloads.
//!
//! Wire names match the socket events consumed by the admin UI
//! (`cameraStarted`, `cameraStopped`, `cameraError`, `faceDetected`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::camera::CameraId;
use crate::detection::DetectionRecord;

/// Classifies a `cameraError` so operators can tell a single broken
/// camera from a globally broken detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CameraErrorKind {
    /// The camera's frame source failed (that camera only)
    Source,
    /// The shared face detector is unavailable (affects every camera)
    Detector,
}

/// Event published to all live subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CameraEvent {
    /// A camera task entered the running state
    CameraStarted {
        #[serde(rename = "cameraId")]
        camera_id: CameraId,
    },

    /// A camera task was stopped and its resources released
    CameraStopped {
        #[serde(rename = "cameraId")]
        camera_id: CameraId,
    },

    /// A camera task failed fatally
    CameraError {
        #[serde(rename = "cameraId")]
        camera_id: CameraId,
        error: String,
        #[serde(rename = "errorKind")]
        kind: CameraErrorKind,
    },

    /// A face was detected, persisted and is being fanned out
    FaceDetected {
        #[serde(rename = "cameraId")]
        camera_id: CameraId,
        detection: DetectionRecord,
        /// Encoded face crop so subscribers need no follow-up fetch
        #[serde(rename = "imageData")]
        image_data: String,
    },
}

impl CameraEvent {
    /// Create a camera started event.
    pub fn started(camera_id: CameraId) -> Self {
        CameraEvent::CameraStarted { camera_id }
    }

    /// Create a camera stopped event.
    pub fn stopped(camera_id: CameraId) -> Self {
        CameraEvent::CameraStopped { camera_id }
    }

    /// Create a camera error event.
    pub fn error(camera_id: CameraId, error: impl Into<String>, kind: CameraErrorKind) -> Self {
        CameraEvent::CameraError {
            camera_id,
            error: error.into(),
            kind,
        }
    }

    /// Create a face detected event from a persisted record.
    pub fn face_detected(detection: DetectionRecord) -> Self {
        CameraEvent::FaceDetected {
            camera_id: detection.camera_id.clone(),
            image_data: detection.image_data.clone(),
            detection,
        }
    }

    /// The camera this event concerns.
    pub fn camera_id(&self) -> &CameraId {
        match self {
            CameraEvent::CameraStarted { camera_id }
            | CameraEvent::CameraStopped { camera_id }
            | CameraEvent::CameraError { camera_id, .. }
            | CameraEvent::FaceDetected { camera_id, .. } => camera_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{BoundingBox, DetectionId, Direction, Keypoint};
    use chrono::Utc;

    #[test]
    fn test_lifecycle_event_serialization() {
        let event = CameraEvent::started(CameraId::from("cam1"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"cameraStarted\""));
        assert!(json.contains("\"cameraId\":\"cam1\""));
    }

    #[test]
    fn test_error_event_distinguishes_kind() {
        let source = CameraEvent::error(CameraId::from("cam1"), "rtsp refused", CameraErrorKind::Source);
        let detector =
            CameraEvent::error(CameraId::from("cam1"), "model load failed", CameraErrorKind::Detector);
        let s = serde_json::to_string(&source).unwrap();
        let d = serde_json::to_string(&detector).unwrap();
        assert!(s.contains("\"errorKind\":\"source\""));
        assert!(d.contains("\"errorKind\":\"detector\""));
    }

    #[test]
    fn test_face_detected_carries_image_data() {
        let record = DetectionRecord {
            id: DetectionId::from_string("d1"),
            camera_id: CameraId::from("cam1"),
            timestamp: Utc::now(),
            bounding_box: BoundingBox::new(10.0, 10.0, 50.0, 60.0),
            keypoints: vec![Keypoint::new(1.0, 2.0)],
            confidence: 0.92,
            image_data: "data:image/jpeg;base64,AAAA".to_string(),
            direction: Direction::Unknown,
        };
        let event = CameraEvent::face_detected(record);
        assert_eq!(event.camera_id().as_str(), "cam1");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"faceDetected\""));
        assert!(json.contains("\"imageData\":\"data:image/jpeg;base64,AAAA\""));
        assert!(json.contains("\"detection\""));
    }
}
