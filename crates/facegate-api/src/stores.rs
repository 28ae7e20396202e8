//! In-memory camera registry and detection store.
//!
//! The admin server keeps both in process: cameras are loaded from a
//! JSON file at boot and detections are held in a bounded ring so the
//! recent-activity view works without a database.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use facegate_engine::{CameraDirectory, DetectionStore, EngineResult};
use facegate_models::{Camera, CameraId, DetectionId, DetectionRecord, NewDetection};

/// Camera registry backed by a JSON file read once at boot.
pub struct FileCameraDirectory {
    cameras: RwLock<Vec<Camera>>,
}

impl FileCameraDirectory {
    /// Load the registry from a JSON array of cameras.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let cameras: Vec<Camera> = serde_json::from_str(&raw)?;
        info!(count = cameras.len(), file = %path.as_ref().display(), "loaded camera registry");
        Ok(Self {
            cameras: RwLock::new(cameras),
        })
    }

    /// Empty registry, for deployments that add cameras over the API.
    pub fn empty() -> Self {
        Self {
            cameras: RwLock::new(Vec::new()),
        }
    }

    /// Register or replace a camera.
    pub async fn upsert(&self, camera: Camera) {
        let mut cameras = self.cameras.write().await;
        if let Some(existing) = cameras.iter_mut().find(|c| c.id == camera.id) {
            *existing = camera;
        } else {
            cameras.push(camera);
        }
    }
}

#[async_trait]
impl CameraDirectory for FileCameraDirectory {
    async fn get_camera(&self, id: &CameraId) -> EngineResult<Option<Camera>> {
        let cameras = self.cameras.read().await;
        Ok(cameras.iter().find(|c| &c.id == id).cloned())
    }

    async fn list_cameras(&self) -> EngineResult<Vec<Camera>> {
        Ok(self.cameras.read().await.clone())
    }
}

/// Bounded in-memory detection store, newest first on read.
pub struct RingDetectionStore {
    capacity: usize,
    records: RwLock<VecDeque<DetectionRecord>>,
}

impl RingDetectionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: RwLock::new(VecDeque::new()),
        }
    }

    /// Most recent detections, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<DetectionRecord> {
        let records = self.records.read().await;
        records.iter().rev().take(limit).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl DetectionStore for RingDetectionStore {
    async fn create_detection(&self, detection: NewDetection) -> EngineResult<DetectionRecord> {
        let record = DetectionRecord::from_new(detection, DetectionId::new(), Utc::now());
        let mut records = self.records.write().await;
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(record)
    }
}

/// Shared handles so callers keep both the trait-object view the engine
/// needs and the concrete one the handlers read from.
pub fn detection_store(capacity: usize) -> (Arc<RingDetectionStore>, Arc<dyn DetectionStore>) {
    let store = Arc::new(RingDetectionStore::new(capacity));
    let dyn_store: Arc<dyn DetectionStore> = Arc::clone(&store) as _;
    (store, dyn_store)
}
