//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`SchedulingEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the engine and
//! any embedding application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use agenda_core::types::RequestId;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

/// A draft passed detection and entered the workflow.
pub const EVENT_SUBMITTED: &str = "request.submitted";
/// A human approved a pending request.
pub const EVENT_APPROVED: &str = "request.approved";
/// A human rejected a pending request.
pub const EVENT_REJECTED: &str = "request.rejected";
/// The external calendar entry was created.
pub const EVENT_PUBLISHED: &str = "request.published";
/// Automatic publishing gave up; manual intervention needed.
pub const EVENT_PUBLISH_FAILED: &str = "request.publish_failed";
/// The request was withdrawn or retracted.
pub const EVENT_CANCELLED: &str = "request.cancelled";

// ---------------------------------------------------------------------------
// SchedulingEvent
// ---------------------------------------------------------------------------

/// A domain event emitted by the scheduling engine.
///
/// Constructed via [`SchedulingEvent::new`] and enriched with
/// [`with_request`](SchedulingEvent::with_request) and
/// [`with_payload`](SchedulingEvent::with_payload). Payloads carry the
/// old/new status and any decision note so the audit log can reconstruct
/// the lifecycle without querying the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingEvent {
    /// Dot-separated event name, e.g. `"request.published"`.
    pub event_type: String,

    /// The event request this event concerns.
    pub request_id: Option<RequestId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl SchedulingEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            request_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the subject request to the event.
    pub fn with_request(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`SchedulingEvent`].
pub struct EventBus {
    sender: broadcast::Sender<SchedulingEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped —
    /// observers are not part of the engine's correctness contract.
    pub fn publish(&self, event: SchedulingEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulingEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let id = RequestId::new_v4();
        let event = SchedulingEvent::new(EVENT_SUBMITTED)
            .with_request(id)
            .with_payload(serde_json::json!({"status": "pending_approval"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, EVENT_SUBMITTED);
        assert_eq!(received.request_id, Some(id));
        assert_eq!(received.payload["status"], "pending_approval");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(SchedulingEvent::new(EVENT_PUBLISHED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, EVENT_PUBLISHED);
        assert_eq!(e2.event_type, EVENT_PUBLISHED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers — this must not panic.
        bus.publish(SchedulingEvent::new(EVENT_CANCELLED));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = SchedulingEvent::new("bare.event");
        assert_eq!(event.event_type, "bare.event");
        assert!(event.request_id.is_none());
        assert!(event.payload.is_object());
    }
}
