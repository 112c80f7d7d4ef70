//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`KeyEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use keydesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A key request was created.
pub const EVENT_REQUEST_CREATED: &str = "request.created";
/// A pending request was approved; the holder took the key.
pub const EVENT_REQUEST_APPROVED: &str = "request.approved";
/// A pending request was rejected.
pub const EVENT_REQUEST_REJECTED: &str = "request.rejected";
/// The holder signalled intent to return the key.
pub const EVENT_RETURN_REQUESTED: &str = "return.requested";
/// A return was approved; the loan is complete.
pub const EVENT_RETURN_APPROVED: &str = "return.approved";
/// A return was rejected; the holder keeps the key.
pub const EVENT_RETURN_REJECTED: &str = "return.rejected";
/// An unreturned key crossed the critical urgency threshold.
pub const EVENT_REQUEST_ESCALATED: &str = "request.escalated";

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred in the key lifecycle.
///
/// Constructed via [`KeyEvent::new`] and enriched with the builder methods
/// [`with_source`](KeyEvent::with_source), [`with_actor`](KeyEvent::with_actor),
/// and [`with_payload`](KeyEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Dot-separated event name, e.g. `"return.approved"`.
    pub event_type: String,

    /// Optional source entity kind (e.g. `"request"`, `"room"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl KeyEvent {
    /// Create a new event with only the required `event_type`.
    ///
    /// All optional fields default to `None` / empty object.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
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
/// independently receive every published [`KeyEvent`].
pub struct EventBus {
    sender: broadcast::Sender<KeyEvent>,
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
    /// If there are no active subscribers the event is silently dropped.
    /// The persistence layer (when subscribed) ensures database capture.
    pub fn publish(&self, event: KeyEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<KeyEvent> {
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

        let event = KeyEvent::new(EVENT_REQUEST_APPROVED)
            .with_source("request", 42)
            .with_actor(7)
            .with_payload(serde_json::json!({"room_id": 3}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, EVENT_REQUEST_APPROVED);
        assert_eq!(received.source_entity_type.as_deref(), Some("request"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["room_id"], 3);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(KeyEvent::new(EVENT_RETURN_APPROVED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, EVENT_RETURN_APPROVED);
        assert_eq!(e2.event_type, EVENT_RETURN_APPROVED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers -- this must not panic.
        bus.publish(KeyEvent::new(EVENT_REQUEST_CREATED));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = KeyEvent::new(EVENT_REQUEST_REJECTED);
        assert_eq!(event.event_type, EVENT_REQUEST_REJECTED);
        assert!(event.source_entity_type.is_none());
        assert!(event.source_entity_id.is_none());
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.is_object());
    }
}
