//! Processor supervisor.
//!
//! Single source of truth for which cameras are being processed. One
//! cancellable tokio task per running camera; the registry map is the
//! only cross-task shared state and is guarded by a mutex held only for
//! map operations, so `list` never waits behind another camera's
//! source-open.
//!
//! Task lifecycle: `Starting -> Running -> (stop | fatal error) -> gone`.
//! A stop that arrives while the entry is still `Starting` is queued and
//! applied as soon as the task reaches `Running`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use facegate_models::{Camera, CameraEvent, CameraId};
use facegate_vision::{FrameSource, SharedDetector, SourceProvider};

use crate::broadcast::{EventBroadcaster, EventStream};
use crate::error::{EngineError, EngineResult};
use crate::pipeline::DetectionPipeline;
use crate::providers::{CameraDirectory, DetectionStore};
use crate::sampler::FrameSampler;

/// Supervisor tuning knobs.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Interval between sampling ticks
    pub tick_interval: Duration,
    /// Process one in `skip_factor` ticks
    pub skip_factor: u32,
    /// Per-subscriber event buffer capacity
    pub event_capacity: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            skip_factor: 5,
            event_capacity: crate::broadcast::DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Snapshot entry returned by [`CameraSupervisor::list`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCamera {
    pub id: CameraId,
    pub name: String,
}

struct TaskHandle {
    name: String,
    generation: u64,
    stop: watch::Sender<bool>,
    join: JoinHandle<()>,
}

enum TaskEntry {
    /// Source is being resolved/opened; `cancelled` queues a stop
    Starting { cancelled: bool },
    Running(TaskHandle),
}

type TaskMap = Arc<Mutex<HashMap<CameraId, TaskEntry>>>;

/// Owns the registry of running camera tasks.
pub struct CameraSupervisor {
    config: SupervisorConfig,
    cameras: Arc<dyn CameraDirectory>,
    store: Arc<dyn DetectionStore>,
    detector: Arc<SharedDetector>,
    sources: Arc<dyn SourceProvider>,
    events: EventBroadcaster,
    tasks: TaskMap,
    generations: AtomicU64,
}

impl CameraSupervisor {
    /// Create a supervisor with injected collaborators.
    pub fn new(
        config: SupervisorConfig,
        cameras: Arc<dyn CameraDirectory>,
        store: Arc<dyn DetectionStore>,
        detector: Arc<SharedDetector>,
        sources: Arc<dyn SourceProvider>,
    ) -> Self {
        let events = EventBroadcaster::new(config.event_capacity);
        Self {
            config,
            cameras,
            store,
            detector,
            sources,
            events,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            generations: AtomicU64::new(0),
        }
    }

    /// Register a new event subscriber.
    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    /// The broadcaster, for transports that publish their own events.
    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Start processing a camera.
    ///
    /// Idempotent: a second start for a camera that is `Starting` or
    /// `Running` succeeds without creating a task or emitting events.
    /// Fails with [`EngineError::CameraNotFound`] for an unknown id and
    /// [`EngineError::SourceUnavailable`] (plus a `cameraError` event)
    /// when the stream cannot be opened.
    pub async fn start(&self, camera_id: &CameraId) -> EngineResult<()> {
        // Placeholder entry first: concurrent starts for the same id
        // cannot both pass this gate.
        {
            let mut tasks = self.tasks.lock().await;
            if tasks.contains_key(camera_id) {
                debug!(camera_id = %camera_id, "camera already processing, start is a no-op");
                return Ok(());
            }
            tasks.insert(camera_id.clone(), TaskEntry::Starting { cancelled: false });
        }

        match self.open_and_spawn(camera_id).await {
            Ok(queued_stop) => {
                if queued_stop {
                    // A stop arrived while the source was opening
                    self.stop(camera_id).await?;
                }
                Ok(())
            }
            Err(e) => {
                self.tasks.lock().await.remove(camera_id);
                if matches!(e, EngineError::CameraNotFound(_)) {
                    // Reported to the caller only; nothing was started
                    return Err(e);
                }
                warn!(camera_id = %camera_id, "failed to start camera: {e}");
                self.events
                    .publish(CameraEvent::error(camera_id.clone(), e.to_string(), e.error_kind()));
                Err(e)
            }
        }
    }

    /// Stop processing a camera and release its resources.
    ///
    /// A stop for a camera with no task is a successful no-op and emits
    /// no `cameraStopped` event. Otherwise the task is cancelled, its
    /// join handle awaited (no leaked timers or tasks) and
    /// `cameraStopped` emitted before returning.
    pub async fn stop(&self, camera_id: &CameraId) -> EngineResult<()> {
        let handle = {
            let mut tasks = self.tasks.lock().await;
            match tasks.remove(camera_id) {
                None => {
                    debug!(camera_id = %camera_id, "stop for idle camera is a no-op");
                    return Ok(());
                }
                Some(TaskEntry::Starting { .. }) => {
                    // Queue the stop; the starting call applies it once
                    // the task reaches Running.
                    tasks.insert(camera_id.clone(), TaskEntry::Starting { cancelled: true });
                    info!(camera_id = %camera_id, "stop queued behind in-flight start");
                    return Ok(());
                }
                Some(TaskEntry::Running(handle)) => handle,
            }
        };

        let _ = handle.stop.send(true);
        if handle.join.await.is_err() {
            warn!(camera_id = %camera_id, "camera task panicked during shutdown");
        }

        metrics::gauge!("facegate_active_cameras").decrement(1.0);
        self.events.publish(CameraEvent::stopped(camera_id.clone()));
        info!(camera_id = %camera_id, name = %handle.name, "camera stopped");
        Ok(())
    }

    /// Snapshot of currently running cameras.
    pub async fn list(&self) -> Vec<ActiveCamera> {
        let tasks = self.tasks.lock().await;
        tasks
            .iter()
            .filter_map(|(id, entry)| match entry {
                TaskEntry::Running(handle) => Some(ActiveCamera {
                    id: id.clone(),
                    name: handle.name.clone(),
                }),
                TaskEntry::Starting { .. } => None,
            })
            .collect()
    }

    /// Start every camera the directory marks active. Individual
    /// failures are logged and skipped so one broken camera cannot keep
    /// the rest down.
    pub async fn start_all_active(&self) -> EngineResult<usize> {
        let cameras = self.cameras.list_cameras().await?;
        let mut started = 0;
        for camera in cameras.into_iter().filter(|c| c.is_active) {
            match self.start(&camera.id).await {
                Ok(()) => started += 1,
                Err(e) => warn!(camera_id = %camera.id, "skipping camera at boot: {e}"),
            }
        }
        Ok(started)
    }

    /// Stop all running cameras, releasing every task.
    pub async fn shutdown(&self) {
        let ids: Vec<CameraId> = {
            let tasks = self.tasks.lock().await;
            tasks.keys().cloned().collect()
        };
        for id in ids {
            if let Err(e) = self.stop(&id).await {
                warn!(camera_id = %id, "error stopping camera during shutdown: {e}");
            }
        }
    }

    /// Resolve the camera, open its source and spawn the task. Returns
    /// whether a stop was queued while the entry was `Starting`.
    async fn open_and_spawn(&self, camera_id: &CameraId) -> EngineResult<bool> {
        let camera = self
            .cameras
            .get_camera(camera_id)
            .await?
            .ok_or_else(|| EngineError::CameraNotFound(camera_id.clone()))?;

        let source = self.sources.open(&camera.source_url).await?;

        let generation = self.generations.fetch_add(1, Ordering::SeqCst);
        let (stop_tx, stop_rx) = watch::channel(false);

        let pipeline = DetectionPipeline::new(
            camera.clone(),
            Arc::clone(&self.detector),
            Arc::clone(&self.store),
            self.events.clone(),
        );
        let ctx = TaskContext {
            camera_id: camera_id.clone(),
            generation,
            tick_interval: self.config.tick_interval,
            skip_factor: self.config.skip_factor,
            tasks: Arc::clone(&self.tasks),
            events: self.events.clone(),
        };
        let join = tokio::spawn(run_camera(source, pipeline, ctx, stop_rx));

        let queued_stop = {
            let mut tasks = self.tasks.lock().await;
            match tasks.get(camera_id) {
                Some(TaskEntry::Starting { cancelled }) => {
                    let queued = *cancelled;
                    tasks.insert(
                        camera_id.clone(),
                        TaskEntry::Running(TaskHandle {
                            name: camera.name.clone(),
                            generation,
                            stop: stop_tx,
                            join,
                        }),
                    );
                    queued
                }
                // Only this call upgrades the placeholder it inserted;
                // anything else means the map was corrupted.
                _ => {
                    error!(camera_id = %camera_id, "start lost its registry entry, aborting task");
                    join.abort();
                    return Err(EngineError::SourceUnavailable(
                        "camera registration lost during start".to_string(),
                    ));
                }
            }
        };

        metrics::gauge!("facegate_active_cameras").increment(1.0);
        self.events.publish(CameraEvent::started(camera_id.clone()));
        info!(camera_id = %camera_id, name = %camera.name, "camera started");
        Ok(queued_stop)
    }
}

struct TaskContext {
    camera_id: CameraId,
    generation: u64,
    tick_interval: Duration,
    skip_factor: u32,
    tasks: TaskMap,
    events: EventBroadcaster,
}

/// Per-camera sampling loop. Runs until stopped or a fatal error.
async fn run_camera(
    source: Box<dyn FrameSource>,
    pipeline: DetectionPipeline,
    ctx: TaskContext,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut sampler = FrameSampler::new(source, ctx.skip_factor);
    let mut ticker = interval(ctx.tick_interval);
    // No catch-up bursts: a delayed tick is simply dropped
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // interval fires immediately; consume that so tick 1 lands a full
    // interval after start
    ticker.tick().await;

    let fatal = loop {
        tokio::select! {
            _ = stop_rx.changed() => break None,
            _ = ticker.tick() => {
                let frame = match sampler.tick() {
                    Ok(None) => continue,
                    Ok(Some(frame)) => frame,
                    Err(e) => break Some(e),
                };
                // A stop during an in-flight detector call abandons the
                // call at its next await point and discards its result.
                tokio::select! {
                    _ = stop_rx.changed() => break None,
                    result = pipeline.process_frame(&frame) => {
                        if let Err(e) = result {
                            break Some(e);
                        }
                    }
                }
            }
        }
    };

    if let Some(e) = fatal {
        // Remove our own registry entry, unless a stop already did or a
        // newer task for this camera replaced it.
        let still_registered = {
            let mut tasks = ctx.tasks.lock().await;
            match tasks.get(&ctx.camera_id) {
                Some(TaskEntry::Running(handle)) if handle.generation == ctx.generation => {
                    tasks.remove(&ctx.camera_id);
                    true
                }
                _ => false,
            }
        };

        if still_registered {
            error!(camera_id = %ctx.camera_id, "camera task failed: {e}");
            metrics::gauge!("facegate_active_cameras").decrement(1.0);
            ctx.events
                .publish(CameraEvent::error(ctx.camera_id.clone(), e.to_string(), e.error_kind()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;
    use tokio::time::advance;

    use facegate_models::{
        BoundingBox, CameraErrorKind, CameraKind, DetectionId, DetectionRecord, Keypoint,
    };
    use facegate_vision::{
        Face, FaceDetector, Frame, SyntheticProvider, SyntheticSource, VisionError, VisionResult,
    };

    use crate::providers::{MockCameraDirectory, MockDetectionStore};

    fn camera(id: &str) -> Camera {
        Camera {
            id: CameraId::from(id),
            name: format!("Camera {id}"),
            source_url: format!("test://{id}"),
            is_active: true,
            kind: CameraKind::Both,
        }
    }

    fn directory_with(cameras: Vec<Camera>) -> MockCameraDirectory {
        let mut directory = MockCameraDirectory::new();
        let lookup = cameras.clone();
        directory.expect_get_camera().returning(move |id| {
            Ok(lookup.iter().find(|c| &c.id == id).cloned())
        });
        directory
            .expect_list_cameras()
            .returning(move || Ok(cameras.clone()));
        directory
    }

    fn accepting_store() -> MockDetectionStore {
        let mut store = MockDetectionStore::new();
        store.expect_create_detection().returning(|d| {
            Ok(DetectionRecord::from_new(
                d,
                DetectionId::from_string("d1"),
                chrono::Utc::now(),
            ))
        });
        store
    }

    struct CountingDetector {
        calls: Arc<AtomicU32>,
        faces: Vec<Face>,
    }

    #[async_trait]
    impl FaceDetector for CountingDetector {
        async fn detect(&self, _frame: &Frame) -> VisionResult<Vec<Face>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.faces.clone())
        }
    }

    struct BrokenInitDetector;

    #[async_trait]
    impl FaceDetector for BrokenInitDetector {
        async fn initialize(&self) -> VisionResult<()> {
            Err(VisionError::detection_failed("model weights missing"))
        }

        async fn detect(&self, _frame: &Frame) -> VisionResult<Vec<Face>> {
            unreachable!("detect must not run after failed init")
        }
    }

    fn one_face() -> Vec<Face> {
        vec![Face {
            bounding_box: BoundingBox::new(10.0, 10.0, 50.0, 60.0),
            keypoints: vec![Keypoint::new(20.0, 20.0)],
            confidence: Some(0.92),
        }]
    }

    struct SupervisorBuilder {
        cameras: Vec<Camera>,
        store: Option<MockDetectionStore>,
        detector: Option<Box<dyn FaceDetector>>,
        sources: Option<Arc<dyn SourceProvider>>,
    }

    impl SupervisorBuilder {
        fn new(cameras: Vec<Camera>) -> Self {
            Self {
                cameras,
                store: None,
                detector: None,
                sources: None,
            }
        }

        fn store(mut self, store: MockDetectionStore) -> Self {
            self.store = Some(store);
            self
        }

        fn detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
            self.detector = Some(detector);
            self
        }

        fn sources(mut self, sources: Arc<dyn SourceProvider>) -> Self {
            self.sources = Some(sources);
            self
        }

        fn build(self) -> CameraSupervisor {
            let detector = self
                .detector
                .unwrap_or_else(|| Box::new(CountingDetector {
                    calls: Arc::new(AtomicU32::new(0)),
                    faces: vec![],
                }));
            CameraSupervisor::new(
                SupervisorConfig::default(),
                Arc::new(directory_with(self.cameras)),
                Arc::new(self.store.unwrap_or_else(accepting_store)),
                Arc::new(SharedDetector::new(detector)),
                self.sources.unwrap_or_else(|| Arc::new(SyntheticProvider)),
            )
        }
    }

    /// Let spawned camera tasks run between clock manipulations.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_ticks(n: u32) {
        for _ in 0..n {
            advance(Duration::from_millis(100)).await;
            settle().await;
        }
    }

    fn drain(stream: &mut EventStream) -> Vec<CameraEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.try_next() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_is_idempotent() {
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")]).build();
        let mut stream = supervisor.subscribe();

        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        settle().await;

        let events = drain(&mut stream);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], CameraEvent::CameraStarted { .. }));

        let active = supervisor.list().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id.as_str(), "cam1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_without_task_is_silent_no_op() {
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")]).build();
        let mut stream = supervisor.subscribe();

        supervisor.stop(&CameraId::from("cam1")).await.unwrap();

        assert!(drain(&mut stream).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_unknown_camera_fails_without_state_change() {
        let supervisor = SupervisorBuilder::new(vec![]).build();
        let mut stream = supervisor.subscribe();

        let err = supervisor.start(&CameraId::from("ghost")).await.unwrap_err();
        assert!(matches!(err, EngineError::CameraNotFound(_)));
        assert!(supervisor.list().await.is_empty());
        assert!(drain(&mut stream).is_empty());
    }

    struct RefusingProvider;

    #[async_trait]
    impl SourceProvider for RefusingProvider {
        async fn open(&self, _locator: &str) -> VisionResult<Box<dyn FrameSource>> {
            Err(VisionError::source_unavailable("connection refused"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_open_failure_emits_camera_error() {
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")])
            .sources(Arc::new(RefusingProvider))
            .build();
        let mut stream = supervisor.subscribe();

        let err = supervisor.start(&CameraId::from("cam1")).await.unwrap_err();
        assert!(matches!(err, EngineError::SourceUnavailable(_)));
        assert!(supervisor.list().await.is_empty());

        let events = drain(&mut stream);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            CameraEvent::CameraError { kind: CameraErrorKind::Source, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admission_attempts_detection_on_every_fifth_tick() {
        let calls = Arc::new(AtomicU32::new(0));
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")])
            .detector(Box::new(CountingDetector {
                calls: Arc::clone(&calls),
                faces: vec![],
            }))
            .build();

        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        settle().await;

        advance_ticks(20).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4); // ticks 5, 10, 15, 20

        supervisor.stop(&CameraId::from("cam1")).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_cameras_run_and_stop_independently() {
        let calls_b = Arc::new(AtomicU32::new(0));
        let supervisor = SupervisorBuilder::new(vec![camera("a"), camera("b")])
            .detector(Box::new(CountingDetector {
                calls: Arc::clone(&calls_b),
                faces: vec![],
            }))
            .build();

        supervisor.start(&CameraId::from("a")).await.unwrap();
        supervisor.start(&CameraId::from("b")).await.unwrap();
        assert_eq!(supervisor.list().await.len(), 2);

        supervisor.stop(&CameraId::from("a")).await.unwrap();
        let active = supervisor.list().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id.as_str(), "b");

        // B keeps sampling after A is gone
        let before = calls_b.load(Ordering::SeqCst);
        advance_ticks(10).await;
        assert!(calls_b.load(Ordering::SeqCst) > before);

        supervisor.stop(&CameraId::from("b")).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_events_after_stop_returns() {
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")])
            .detector(Box::new(CountingDetector {
                calls: Arc::new(AtomicU32::new(0)),
                faces: one_face(),
            }))
            .build();
        let mut stream = supervisor.subscribe();

        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        settle().await;
        advance_ticks(5).await;
        supervisor.stop(&CameraId::from("cam1")).await.unwrap();

        // Everything so far ends with the stop event
        let events = drain(&mut stream);
        assert!(matches!(events.last(), Some(CameraEvent::CameraStopped { .. })));

        // The clock keeps moving but the task is gone
        advance_ticks(10).await;
        assert!(drain(&mut stream).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detector_init_failure_is_fatal_and_globally_marked() {
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")])
            .detector(Box::new(BrokenInitDetector))
            .build();
        let mut stream = supervisor.subscribe();

        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        settle().await;
        advance_ticks(5).await; // first admitted tick triggers init

        let events = drain(&mut stream);
        assert!(matches!(events.first(), Some(CameraEvent::CameraStarted { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            CameraEvent::CameraError { kind: CameraErrorKind::Detector, .. }
        )));
        assert!(supervisor.list().await.is_empty());
    }

    struct DyingSourceProvider;

    #[async_trait]
    impl SourceProvider for DyingSourceProvider {
        async fn open(&self, _locator: &str) -> VisionResult<Box<dyn FrameSource>> {
            Ok(Box::new(SyntheticSource::new(64, 48).with_fail_after(1)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mid_run_source_loss_ends_task_with_camera_error() {
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")])
            .sources(Arc::new(DyingSourceProvider))
            .build();
        let mut stream = supervisor.subscribe();

        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        settle().await;
        advance_ticks(10).await; // second admitted tick hits the dead source

        let events = drain(&mut stream);
        assert!(events.iter().any(|e| matches!(
            e,
            CameraEvent::CameraError { kind: CameraErrorKind::Source, .. }
        )));
        assert!(supervisor.list().await.is_empty());

        // The camera can be started again after the failure
        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        assert_eq!(supervisor.list().await.len(), 1);
        supervisor.stop(&CameraId::from("cam1")).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_detection_event() {
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")])
            .detector(Box::new(CountingDetector {
                calls: Arc::new(AtomicU32::new(0)),
                faces: one_face(),
            }))
            .build();
        let mut stream = supervisor.subscribe();

        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        settle().await;
        advance_ticks(5).await; // one admitted tick

        let events = drain(&mut stream);
        let detection_events: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, CameraEvent::FaceDetected { .. }))
            .collect();
        assert_eq!(detection_events.len(), 1);
        match detection_events[0] {
            CameraEvent::FaceDetected {
                camera_id,
                detection,
                image_data,
            } => {
                assert_eq!(camera_id.as_str(), "cam1");
                assert_eq!(detection.id.as_str(), "d1");
                assert_eq!(detection.confidence, 0.92);
                assert!(!image_data.is_empty());
            }
            _ => unreachable!(),
        }

        supervisor.stop(&CameraId::from("cam1")).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_persist_failure_does_not_kill_task() {
        let mut store = MockDetectionStore::new();
        let mut call = 0u32;
        store.expect_create_detection().returning(move |d| {
            call += 1;
            if call == 1 {
                Err(EngineError::persist_failed("write refused"))
            } else {
                Ok(DetectionRecord::from_new(
                    d,
                    DetectionId::from_string("d2"),
                    chrono::Utc::now(),
                ))
            }
        });
        let supervisor = SupervisorBuilder::new(vec![camera("cam1")])
            .store(store)
            .detector(Box::new(CountingDetector {
                calls: Arc::new(AtomicU32::new(0)),
                faces: one_face(),
            }))
            .build();
        let mut stream = supervisor.subscribe();

        supervisor.start(&CameraId::from("cam1")).await.unwrap();
        settle().await;
        advance_ticks(10).await; // two admitted ticks

        let events = drain(&mut stream);
        let detections: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, CameraEvent::FaceDetected { .. }))
            .collect();
        // First admitted tick was dropped on persist failure, second made it
        assert_eq!(detections.len(), 1);
        assert_eq!(supervisor.list().await.len(), 1);

        supervisor.stop(&CameraId::from("cam1")).await.unwrap();
    }

    struct SlowProvider;

    #[async_trait]
    impl SourceProvider for SlowProvider {
        async fn open(&self, _locator: &str) -> VisionResult<Box<dyn FrameSource>> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(Box::new(SyntheticSource::new(64, 48)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_start_is_applied_once_running() {
        let supervisor = Arc::new(
            SupervisorBuilder::new(vec![camera("cam1")])
                .sources(Arc::new(SlowProvider))
                .build(),
        );
        let mut stream = supervisor.subscribe();

        let starter = {
            let supervisor = Arc::clone(&supervisor);
            tokio::spawn(async move { supervisor.start(&CameraId::from("cam1")).await })
        };

        // Let the start reach the slow source-open, then stop mid-flight
        settle().await;
        advance(Duration::from_millis(100)).await;
        settle().await;
        supervisor.stop(&CameraId::from("cam1")).await.unwrap();

        // Finish the open; the queued stop is applied right after Running
        advance(Duration::from_millis(500)).await;
        starter.await.unwrap().unwrap();
        settle().await;

        let events = drain(&mut stream);
        assert!(matches!(events.first(), Some(CameraEvent::CameraStarted { .. })));
        assert!(matches!(events.last(), Some(CameraEvent::CameraStopped { .. })));
        assert!(supervisor.list().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_all_active_skips_inactive_cameras() {
        let mut idle = camera("idle");
        idle.is_active = false;
        let supervisor =
            SupervisorBuilder::new(vec![camera("a"), camera("b"), idle]).build();

        let started = supervisor.start_all_active().await.unwrap();
        assert_eq!(started, 2);
        assert_eq!(supervisor.list().await.len(), 2);

        supervisor.shutdown().await;
        assert!(supervisor.list().await.is_empty());
    }
}
