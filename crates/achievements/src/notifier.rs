//! Hand-off of award notifications to a delivery collaborator.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use catchlog_events::{EventBus, PlatformEvent, EVENT_BADGE_AWARDED};

use crate::coordinator::BadgeNotification;

/// Receives one notification per successful grant. Delivery is best effort.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &BadgeNotification);
}

/// Publishes `badge.awarded` events on the platform event bus.
///
/// Holds a weak handle so the engine never keeps the bus (and with it its
/// own event channel) alive after the application drops it.
pub struct EventBusNotifier {
    bus: Weak<EventBus>,
}

impl EventBusNotifier {
    pub fn new(bus: &Arc<EventBus>) -> Self {
        Self {
            bus: Arc::downgrade(bus),
        }
    }
}

#[async_trait]
impl NotificationSink for EventBusNotifier {
    async fn deliver(&self, notification: &BadgeNotification) {
        let Some(bus) = self.bus.upgrade() else {
            tracing::debug!(
                user_id = notification.user_id,
                badge_code = %notification.badge_code,
                "Event bus closed, badge notification dropped"
            );
            return;
        };

        let payload = match serde_json::to_value(notification) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    badge_code = %notification.badge_code,
                    "Failed to encode badge notification"
                );
                return;
            }
        };

        bus.publish(
            PlatformEvent::new(EVENT_BADGE_AWARDED)
                .with_actor(notification.user_id)
                .with_payload(payload),
        );
    }
}
