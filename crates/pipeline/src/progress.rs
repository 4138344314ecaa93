//! Per-shot progress reporting.
//!
//! The orchestrator reports to a synchronous [`ProgressSink`]. Closures work
//! directly; [`ProgressBus`] fans events out to any number of async
//! subscribers over a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use turnaround_core::types::ShotId;
use turnaround_provider::GenerationResult;

// ---------------------------------------------------------------------------
// ProgressEvent
// ---------------------------------------------------------------------------

/// Where a shot is in its generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ProgressPhase {
    Start,
    Complete { result: GenerationResult },
    Error { message: String },
}

/// One progress notification for the shot at `index`.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub index: usize,
    pub shot_id: ShotId,
    #[serde(flatten)]
    pub phase: ProgressPhase,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(index: usize, shot_id: ShotId, phase: ProgressPhase) -> Self {
        Self {
            index,
            shot_id,
            phase,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receiver of progress events. Called inline by the orchestrator, so
/// implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out progress bus, shareable via `Arc<ProgressBus>`.
pub struct ProgressBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBus {
    /// Create a bus with a specific channel capacity. Slow receivers that
    /// fall more than `capacity` events behind observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped when there are
    /// none.
    pub fn publish(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ProgressSink for ProgressBus {
    fn on_progress(&self, event: &ProgressEvent) {
        self.publish(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn start(index: usize) -> ProgressEvent {
        ProgressEvent::new(index, ShotId::new_v4(), ProgressPhase::Start)
    }

    #[tokio::test]
    async fn bus_delivers_to_every_subscriber() {
        let bus = ProgressBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.on_progress(&start(3));

        assert_eq!(rx1.recv().await.unwrap().index, 3);
        assert_eq!(rx2.recv().await.unwrap().index, 3);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        ProgressBus::default().publish(start(0));
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| seen.lock().unwrap().push(e.index);
        sink.on_progress(&start(1));
        sink.on_progress(&start(2));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn event_serializes_flat() {
        let event = ProgressEvent::new(
            0,
            ShotId::new_v4(),
            ProgressPhase::Error {
                message: "boom".to_string(),
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["phase"], "error");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["index"], 0);
    }
}
