//! Frame sources.
//!
//! A [`SourceProvider`] turns a camera's source locator into an open
//! [`FrameSource`]. The provider owns locator validation; the source
//! yields frames until it fails or is dropped. Dropping the source
//! releases the stream handle.

use async_trait::async_trait;
use rand::Rng;
use url::Url;

use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;

/// An open per-camera stream of frames.
///
/// Read from a single task; implementations need not be `Sync`.
pub trait FrameSource: Send {
    /// Grab the most recent frame.
    ///
    /// An error is fatal for the camera task; there is no partial-read
    /// recovery at this seam.
    fn next_frame(&mut self) -> VisionResult<Frame>;
}

/// Opens frame sources from camera source locators.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Open a stream for `locator`.
    async fn open(&self, locator: &str) -> VisionResult<Box<dyn FrameSource>>;
}

/// Placeholder frame source producing noise frames.
///
/// The production system plugs a real decoder in behind
/// [`SourceProvider`]; this stands in for it during development and in
/// tests.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frames_served: u64,
    /// Fail after this many frames when set, to exercise mid-run source
    /// loss.
    fail_after: Option<u64>,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames_served: 0,
            fail_after: None,
        }
    }

    /// Make the source fail after serving `n` frames.
    pub fn with_fail_after(mut self, n: u64) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> VisionResult<Frame> {
        if let Some(limit) = self.fail_after {
            if self.frames_served >= limit {
                return Err(VisionError::source_unavailable("synthetic stream ended"));
            }
        }
        self.frames_served += 1;

        // Vary brightness a little so consecutive frames differ
        let base = (self.frames_served % 64) as u8 + 96;
        let jitter: u8 = rand::rng().random_range(0..8);
        Ok(Frame::filled(self.width, self.height, base.saturating_add(jitter)))
    }
}

/// Default frame dimensions for synthetic streams.
const SYNTHETIC_WIDTH: u32 = 640;
const SYNTHETIC_HEIGHT: u32 = 480;

/// Provider backed by [`SyntheticSource`].
///
/// Accepts `rtsp://` and `test://` locators; anything unparsable or with
/// another scheme is reported as unavailable, so a misconfigured camera
/// fails at start rather than mid-run.
#[derive(Debug, Default)]
pub struct SyntheticProvider;

#[async_trait]
impl SourceProvider for SyntheticProvider {
    async fn open(&self, locator: &str) -> VisionResult<Box<dyn FrameSource>> {
        let url =
            Url::parse(locator).map_err(|e| VisionError::InvalidLocator(format!("{locator}: {e}")))?;

        match url.scheme() {
            "rtsp" | "test" => Ok(Box::new(SyntheticSource::new(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT))),
            other => Err(VisionError::source_unavailable(format!(
                "unsupported stream scheme '{other}'"
            ))),
        }
    }
}
