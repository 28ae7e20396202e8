//! Face detector capability.
//!
//! The detector is an injected capability: possibly expensive to
//! initialize, possibly not safe for concurrent invocation.
//! [`SharedDetector`] wraps any implementation with one-time lazy
//! initialization and call serialization so N camera tasks can share a
//! single instance.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use facegate_models::{BoundingBox, Keypoint};

use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;

/// Confidence substituted when a detector produces no native score.
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// One detected face region.
#[derive(Debug, Clone)]
pub struct Face {
    /// Bounding box in source-frame pixel coordinates; may extend past
    /// the frame edges
    pub bounding_box: BoundingBox,
    /// Landmark points
    pub keypoints: Vec<Keypoint>,
    /// Native confidence score, when the detector produces one
    pub confidence: Option<f64>,
}

impl Face {
    /// Confidence clamped to [0, 1], substituting the fixed default when
    /// the detector supplied none.
    pub fn effective_confidence(&self) -> f64 {
        self.confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0)
    }
}

/// Face detection capability.
///
/// `initialize` is invoked once before the first `detect`; a failure
/// there is fatal for every camera sharing the detector. A `detect`
/// failure only loses that one call.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Load models or otherwise prepare the detector.
    async fn initialize(&self) -> VisionResult<()> {
        Ok(())
    }

    /// Detect faces in one frame.
    async fn detect(&self, frame: &Frame) -> VisionResult<Vec<Face>>;
}

enum InitState {
    Pending,
    Ready,
    Failed(String),
}

/// Shared detector wrapper.
///
/// Serializes initialization and all detect calls through one mutex:
/// camera tasks sharing a concurrency-unsafe detector queue behind each
/// other, and calls from a single camera keep their order. An
/// initialization failure is sticky; every subsequent call from any
/// camera observes the same `DetectorUnavailable`.
pub struct SharedDetector {
    inner: Box<dyn FaceDetector>,
    state: Mutex<InitState>,
}

impl SharedDetector {
    /// Wrap a detector implementation.
    pub fn new(inner: Box<dyn FaceDetector>) -> Self {
        Self {
            inner,
            state: Mutex::new(InitState::Pending),
        }
    }

    /// Detect faces, initializing the detector on first use.
    pub async fn detect(&self, frame: &Frame) -> VisionResult<Vec<Face>> {
        let mut state = self.state.lock().await;

        match &*state {
            InitState::Ready => {}
            InitState::Failed(msg) => {
                return Err(VisionError::detector_unavailable(msg.clone()));
            }
            InitState::Pending => match self.inner.initialize().await {
                Ok(()) => {
                    info!("face detector initialized");
                    *state = InitState::Ready;
                }
                Err(e) => {
                    let msg = e.to_string();
                    warn!("face detector initialization failed: {msg}");
                    *state = InitState::Failed(msg.clone());
                    return Err(VisionError::detector_unavailable(msg));
                }
            },
        }

        // Lock held across the call: shared detectors are not assumed
        // concurrency-safe.
        self.inner.detect(frame).await
    }

    /// Whether initialization has permanently failed.
    pub async fn is_failed(&self) -> bool {
        matches!(&*self.state.lock().await, InitState::Failed(_))
    }
}

/// Placeholder detector emitting one centered face per frame.
///
/// Stands in for a real geometry model during development. No native
/// confidence score.
#[derive(Debug, Default)]
pub struct SyntheticDetector;

#[async_trait]
impl FaceDetector for SyntheticDetector {
    async fn detect(&self, frame: &Frame) -> VisionResult<Vec<Face>> {
        let w = frame.width() as f64;
        let h = frame.height() as f64;
        let bounding_box = BoundingBox::new(w * 0.375, h * 0.3, w * 0.25, h * 0.4);
        let keypoints = vec![
            Keypoint::named(w * 0.44, h * 0.42, "leftEye"),
            Keypoint::named(w * 0.56, h * 0.42, "rightEye"),
            Keypoint::named(w * 0.5, h * 0.52, "noseTip"),
            Keypoint::named(w * 0.5, h * 0.62, "mouthCenter"),
        ];
        Ok(vec![Face {
            bounding_box,
            keypoints,
            confidence: None,
        }])
    }
}
