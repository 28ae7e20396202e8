//! Application state.

use std::sync::Arc;

use facegate_engine::CameraSupervisor;
use facegate_vision::{SharedDetector, SourceProvider, SyntheticDetector, SyntheticProvider};

use crate::config::ApiConfig;
use crate::stores::{detection_store, FileCameraDirectory, RingDetectionStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub cameras: Arc<FileCameraDirectory>,
    pub detections: Arc<RingDetectionStore>,
    pub supervisor: Arc<CameraSupervisor>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let cameras = match &config.cameras_file {
            Some(path) => Arc::new(FileCameraDirectory::load(path)?),
            None => Arc::new(FileCameraDirectory::empty()),
        };
        let (detections, dyn_store) = detection_store(config.detection_retention);

        // TODO: swap SyntheticDetector for the onnx-backed detector once
        // the model export lands
        let detector = Arc::new(SharedDetector::new(Box::new(SyntheticDetector::default())));
        let sources: Arc<dyn SourceProvider> = Arc::new(SyntheticProvider);

        let supervisor = Arc::new(CameraSupervisor::new(
            config.supervisor_config(),
            Arc::clone(&cameras) as _,
            dyn_store,
            detector,
            sources,
        ));

        Ok(Self {
            config,
            cameras,
            detections,
            supervisor,
        })
    }
}
