//! Best-effort event fan-out.
//!
//! Built on `tokio::sync::broadcast`: every subscriber gets its own
//! bounded buffer, publishing never blocks, and a subscriber that falls
//! more than the channel capacity behind loses its oldest events
//! (drop-oldest policy). No backlog is delivered to new subscribers.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use facegate_models::CameraEvent;

/// Default per-subscriber buffer capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Publishes lifecycle and detection events to all current subscribers.
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<CameraEvent>,
}

impl EventBroadcaster {
    /// Create a broadcaster with the given per-subscriber capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new observer. Only events published after this call
    /// are delivered.
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            rx: self.tx.subscribe(),
        }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Fire-and-forget: delivery failures never propagate back to the
    /// pipeline. Publishing with zero subscribers is a normal outcome.
    pub fn publish(&self, event: CameraEvent) {
        metrics::counter!("facegate_events_published_total").increment(1);
        if self.tx.send(event).is_err() {
            debug!("event published with no subscribers");
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// One subscriber's view of the event stream. Dropping it unsubscribes.
pub struct EventStream {
    rx: broadcast::Receiver<CameraEvent>,
}

impl EventStream {
    /// Wait for the next event. Returns `None` once the broadcaster is
    /// gone. A lagged subscriber skips the dropped events and keeps
    /// receiving from the oldest retained one.
    pub async fn next(&mut self) -> Option<CameraEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("slow event subscriber dropped {missed} events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take an already-delivered event without waiting.
    pub fn try_next(&mut self) -> Option<CameraEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!("slow event subscriber dropped {missed} events");
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facegate_models::CameraId;

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let events = EventBroadcaster::default();
        events.publish(CameraEvent::started(CameraId::from("cam1")));
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_only_later_events() {
        let events = EventBroadcaster::default();
        events.publish(CameraEvent::started(CameraId::from("before")));

        let mut stream = events.subscribe();
        events.publish(CameraEvent::started(CameraId::from("after")));

        let event = stream.next().await.unwrap();
        assert_eq!(event.camera_id().as_str(), "after");
        assert!(stream.try_next().is_none());
    }

    #[tokio::test]
    async fn test_independent_subscribers() {
        let events = EventBroadcaster::default();
        let mut a = events.subscribe();
        let mut b = events.subscribe();
        events.publish(CameraEvent::stopped(CameraId::from("cam1")));

        assert!(a.next().await.is_some());
        assert!(b.next().await.is_some());
    }

    #[tokio::test]
    async fn test_slow_subscriber_drops_oldest() {
        let events = EventBroadcaster::new(4);
        let mut slow = events.subscribe();

        for i in 0..10 {
            events.publish(CameraEvent::started(CameraId::from_string(format!("cam{i}"))));
        }

        // The oldest events were dropped; the stream resumes at cam6
        let first = slow.next().await.unwrap();
        assert_eq!(first.camera_id().as_str(), "cam6");
        let mut remaining = 0;
        while slow.try_next().is_some() {
            remaining += 1;
        }
        assert_eq!(remaining, 3);
    }

    #[tokio::test]
    async fn test_dropped_stream_unsubscribes() {
        let events = EventBroadcaster::default();
        let stream = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);
        drop(stream);
        assert_eq!(events.subscriber_count(), 0);
    }
}
