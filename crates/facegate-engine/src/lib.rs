//! Camera processing supervisor.
//!
//! This crate owns the per-camera processing loops:
//! - [`CameraSupervisor`]: registry of running camera tasks, start/stop/list
//! - [`FrameSampler`] + [`admit`]: fixed-cadence ticks with modulo admission
//! - [`DetectionPipeline`]: detect, clamp, crop, persist, broadcast
//! - [`EventBroadcaster`]: best-effort fan-out to live subscribers
//!
//! Storage and camera lookup are external collaborators behind the
//! [`CameraDirectory`] and [`DetectionStore`] traits.

pub mod broadcast;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod sampler;
pub mod supervisor;

pub use broadcast::{EventBroadcaster, EventStream, DEFAULT_EVENT_CAPACITY};
pub use error::{EngineError, EngineResult};
pub use pipeline::{DetectionPipeline, MAX_STORED_KEYPOINTS};
pub use providers::{CameraDirectory, DetectionStore};
pub use sampler::{admit, FrameSampler};
pub use supervisor::{ActiveCamera, CameraSupervisor, SupervisorConfig};
