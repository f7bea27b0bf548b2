//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`PlatformEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use catchlog_core::domain_events::{
    DomainEvent, EVENT_COMMENT_CREATED, EVENT_POST_CREATED, EVENT_POST_LIKED,
};
use catchlog_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Published once per successful badge grant.
pub const EVENT_BADGE_AWARDED: &str = "badge.awarded";

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the platform.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor), and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"post.created"`.
    pub event_type: String,

    /// Optional source entity kind (e.g. `"post"`, `"comment"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: Timestamp,
}

impl PlatformEvent {
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

    /// Wrap a typed domain event in the bus envelope.
    pub fn from_domain(event: &DomainEvent) -> Self {
        let (entity_type, entity_id) = match event {
            DomainEvent::PostCreated { post_id, .. } => ("post", *post_id),
            DomainEvent::CommentCreated { comment_id, .. } => ("comment", *comment_id),
            DomainEvent::PostLiked { post_id, .. } => ("post", *post_id),
        };
        // Serializing a plain enum of integers and floats cannot fail.
        let payload = serde_json::to_value(event).unwrap_or_default();

        Self::new(event.event_type())
            .with_source(entity_type, entity_id)
            .with_actor(event.actor_user_id())
            .with_payload(payload)
    }

    /// Decode the typed domain event carried by this envelope.
    ///
    /// Returns `Ok(None)` for event types the badge engine does not know
    /// about. Unknown payload fields are ignored. The `type` tag always comes
    /// from `event_type`; any tag in the payload is overwritten.
    pub fn domain_event(&self) -> Result<Option<DomainEvent>, serde_json::Error> {
        let tag = match self.event_type.as_str() {
            EVENT_POST_CREATED => "post_created",
            EVENT_COMMENT_CREATED => "comment_created",
            EVENT_POST_LIKED => "post_liked",
            _ => return Ok(None),
        };

        let mut payload = self.payload.clone();
        if let serde_json::Value::Object(map) = &mut payload {
            map.insert("type".into(), serde_json::Value::String(tag.to_string()));
        }
        serde_json::from_value(payload).map(Some)
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
/// independently receive every published [`PlatformEvent`].
///
/// # Usage
///
/// ```rust
/// use catchlog_events::bus::{EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new("post.created"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
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
    /// Never blocks. If there are no active subscribers the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        // A SendError only means there are zero receivers.
        if self.sender.send(event).is_err() {
            tracing::debug!("Event published with no subscribers");
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
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
