//! Face detection models.
//!
//! A detection is immutable once created: the pipeline builds a
//! [`NewDetection`], the store assigns id and timestamp and hands back a
//! [`DetectionRecord`].

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{CameraId, CameraKind};

/// Unique identifier for a stored detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DetectionId(pub String);

impl DetectionId {
    /// Generate a new random detection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DetectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DetectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A face bounding box in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// X coordinate of the top-left corner
    pub x: f64,
    /// Y coordinate of the top-left corner
    pub y: f64,
    /// Box width in pixels
    pub width: f64,
    /// Box height in pixels
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Box area in square pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether the box covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }

    /// Clamp the box to the bounds of a `frame_width` x `frame_height`
    /// frame.
    ///
    /// A detector may return boxes extending past the frame edges; the
    /// result is the intersection with the frame, possibly empty. Never
    /// fails.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> BoundingBox {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let x = self.x.clamp(0.0, fw);
        let y = self.y.clamp(0.0, fh);
        let width = (self.x + self.width).clamp(0.0, fw) - x;
        let height = (self.y + self.height).clamp(0.0, fh) - y;
        BoundingBox { x, y, width, height }
    }
}

/// A single face landmark point in source-frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    /// Landmark name when the detector labels its points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keypoint {
    /// Create an unnamed keypoint.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, name: None }
    }

    /// Create a named keypoint.
    pub fn named(x: f64, y: f64, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            name: Some(name.into()),
        }
    }
}

/// Direction attributed to a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Entry,
    Exit,
    #[default]
    Unknown,
}

impl From<CameraKind> for Direction {
    fn from(kind: CameraKind) -> Self {
        match kind {
            CameraKind::Entry => Direction::Entry,
            CameraKind::Exit => Direction::Exit,
            CameraKind::Both => Direction::Unknown,
        }
    }
}

/// A detection ready for persistence (no id or timestamp yet).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDetection {
    /// Originating camera
    pub camera_id: CameraId,
    /// Bounding box clamped to frame bounds
    pub bounding_box: BoundingBox,
    /// Landmark points (capped by the pipeline)
    pub keypoints: Vec<Keypoint>,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    /// Encoded face crop (base64 JPEG data URL)
    pub image_data: String,
    /// Entry/exit attribution
    #[serde(default)]
    pub direction: Direction,
}

/// A persisted detection as returned by the detection store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    /// Store-assigned ID
    pub id: DetectionId,
    /// Originating camera
    pub camera_id: CameraId,
    /// Capture timestamp assigned by the store
    pub timestamp: DateTime<Utc>,
    /// Bounding box clamped to frame bounds
    pub bounding_box: BoundingBox,
    /// Landmark points
    pub keypoints: Vec<Keypoint>,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    /// Encoded face crop (base64 JPEG data URL)
    pub image_data: String,
    /// Entry/exit attribution
    #[serde(default)]
    pub direction: Direction,
}

impl DetectionRecord {
    /// Build a record from a [`NewDetection`] plus store-assigned identity.
    pub fn from_new(detection: NewDetection, id: DetectionId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            camera_id: detection.camera_id,
            timestamp,
            bounding_box: detection.bounding_box,
            keypoints: detection.keypoints,
            confidence: detection.confidence,
            image_data: detection.image_data,
            direction: detection.direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_frame_is_identity() {
        let b = BoundingBox::new(10.0, 10.0, 50.0, 60.0);
        assert_eq!(b.clamp_to(640, 480), b);
    }

    #[test]
    fn test_clamp_negative_origin() {
        let b = BoundingBox::new(-10.0, -10.0, 50.0, 50.0);
        let clamped = b.clamp_to(640, 480);
        assert_eq!(clamped.x, 0.0);
        assert_eq!(clamped.y, 0.0);
        assert_eq!(clamped.width, 40.0);
        assert_eq!(clamped.height, 40.0);
        assert!(!clamped.is_empty());
    }

    #[test]
    fn test_clamp_overflowing_edge() {
        let b = BoundingBox::new(600.0, 440.0, 100.0, 100.0);
        let clamped = b.clamp_to(640, 480);
        assert_eq!(clamped.width, 40.0);
        assert_eq!(clamped.height, 40.0);
    }

    #[test]
    fn test_clamp_fully_outside_is_empty() {
        let b = BoundingBox::new(700.0, 500.0, 50.0, 50.0);
        let clamped = b.clamp_to(640, 480);
        assert!(clamped.is_empty());
    }

    #[test]
    fn test_direction_from_camera_kind() {
        assert_eq!(Direction::from(CameraKind::Entry), Direction::Entry);
        assert_eq!(Direction::from(CameraKind::Exit), Direction::Exit);
        assert_eq!(Direction::from(CameraKind::Both), Direction::Unknown);
    }

    #[test]
    fn test_detection_record_wire_names() {
        let record = DetectionRecord {
            id: DetectionId::from_string("d1"),
            camera_id: CameraId::from("cam1"),
            timestamp: Utc::now(),
            bounding_box: BoundingBox::new(10.0, 10.0, 50.0, 60.0),
            keypoints: vec![Keypoint::named(12.0, 14.0, "leftEye")],
            confidence: 0.92,
            image_data: "data:image/jpeg;base64,AAAA".to_string(),
            direction: Direction::Unknown,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"cameraId\":\"cam1\""));
        assert!(json.contains("\"boundingBox\""));
        assert!(json.contains("\"imageData\""));
        assert!(json.contains("\"confidence\":0.92"));
    }
}
