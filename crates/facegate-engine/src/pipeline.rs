//! Detection pipeline: one admitted frame in, zero or more persisted and
//! broadcast detections out.
//!
//! Failure containment:
//! - detector init failure is fatal for the camera task
//! - a per-call detect failure loses that tick only (zero faces, logged)
//! - an encode or persist failure loses that one detection only

use std::sync::Arc;

use tracing::{debug, warn};

use facegate_models::{Camera, CameraEvent, NewDetection};
use facegate_vision::{encode_face, Frame, SharedDetector};

use crate::broadcast::EventBroadcaster;
use crate::error::EngineResult;
use crate::providers::DetectionStore;

/// Keypoints persisted per detection; detectors may return hundreds of
/// mesh points but the stored record keeps only the leading ones.
pub const MAX_STORED_KEYPOINTS: usize = 10;

/// Per-camera detection pipeline.
pub struct DetectionPipeline {
    camera: Camera,
    detector: Arc<SharedDetector>,
    store: Arc<dyn DetectionStore>,
    events: EventBroadcaster,
}

impl DetectionPipeline {
    /// Create a pipeline for one camera.
    pub fn new(
        camera: Camera,
        detector: Arc<SharedDetector>,
        store: Arc<dyn DetectionStore>,
        events: EventBroadcaster,
    ) -> Self {
        Self {
            camera,
            detector,
            store,
            events,
        }
    }

    /// Process one admitted frame. Returns the number of detections
    /// broadcast. An `Err` is fatal for the camera task.
    pub async fn process_frame(&self, frame: &Frame) -> EngineResult<usize> {
        let faces = match self.detector.detect(frame).await {
            Ok(faces) => faces,
            Err(e) if e.is_detector_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(camera_id = %self.camera.id, "detection call failed, skipping tick: {e}");
                return Ok(0);
            }
        };

        // Zero faces is a normal, silent outcome
        let mut published = 0;
        for face in faces {
            let bounding_box = face.bounding_box.clamp_to(frame.width(), frame.height());
            if bounding_box.is_empty() {
                debug!(camera_id = %self.camera.id, "face box entirely outside frame, skipped");
                continue;
            }

            let image_data = match encode_face(frame, &bounding_box) {
                Ok(data) => data,
                Err(e) => {
                    warn!(camera_id = %self.camera.id, "face crop encode failed, dropping detection: {e}");
                    continue;
                }
            };

            let mut keypoints = face.keypoints.clone();
            keypoints.truncate(MAX_STORED_KEYPOINTS);

            let detection = NewDetection {
                camera_id: self.camera.id.clone(),
                bounding_box,
                keypoints,
                confidence: face.effective_confidence(),
                image_data,
                direction: self.camera.kind.into(),
            };

            match self.store.create_detection(detection).await {
                Ok(record) => {
                    metrics::counter!("facegate_detections_total").increment(1);
                    self.events.publish(CameraEvent::face_detected(record));
                    published += 1;
                }
                Err(e) => {
                    // Recoverable: drop this one detection, keep the task alive
                    warn!(camera_id = %self.camera.id, "failed to persist detection, dropping: {e}");
                }
            }
        }

        Ok(published)
    }

    /// The camera this pipeline serves.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
