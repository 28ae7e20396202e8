//! Frame sampling and admission control.
//!
//! The timer lives in the camera task; this module owns the part that
//! can be tested without timers: the monotonic tick counter and the
//! modulo admission decision.

use facegate_vision::{Frame, FrameSource};

use crate::error::EngineResult;

/// Admission decision for one tick.
///
/// A tick is admitted when `tick % skip_factor == 0`: with the default
/// skip factor of 5, ticks 5, 10, 15, ... are processed and the rest are
/// dropped. A skip factor of 0 or 1 admits every tick.
pub fn admit(tick: u64, skip_factor: u32) -> bool {
    let skip = u64::from(skip_factor.max(1));
    tick % skip == 0
}

/// Per-camera sampler: counts ticks and reads a frame only for admitted
/// ones.
///
/// Non-admitted ticks are silently dropped; there is no queue, so an
/// admitted tick always reflects the most recent frame.
pub struct FrameSampler {
    source: Box<dyn FrameSource>,
    skip_factor: u32,
    ticks_seen: u64,
}

impl FrameSampler {
    /// Wrap an open frame source.
    pub fn new(source: Box<dyn FrameSource>, skip_factor: u32) -> Self {
        Self {
            source,
            skip_factor,
            ticks_seen: 0,
        }
    }

    /// Record one timer tick. Returns the current frame when the tick is
    /// admitted, `None` when it is skipped. A source error is fatal for
    /// the camera task.
    pub fn tick(&mut self) -> EngineResult<Option<Frame>> {
        self.ticks_seen += 1;
        if !admit(self.ticks_seen, self.skip_factor) {
            return Ok(None);
        }
        let frame = self.source.next_frame()?;
        Ok(Some(frame))
    }

    /// Total ticks observed since the task started.
    pub fn ticks_seen(&self) -> u64 {
        self.ticks_seen
    }
}
