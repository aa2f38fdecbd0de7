//! Event broadcasting for retention lifecycle notifications.
//!
//! Services publish events that delivery transports (email workers,
//! dashboards) consume by subscribing; a bus with no subscribers drops
//! events, which is fine because every event is also logged and the
//! database row remains the source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default channel capacity for the event bus. Slow receivers beyond this
/// start missing events (lagging).
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Server events broadcast to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// An organization finished the closing saga.
    OrganizationClosed {
        organization_id: Uuid,
        archive_id: Uuid,
        closed_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },

    /// An archive is approaching its purge deadline.
    ArchiveExpiring {
        archive_id: Uuid,
        organization_id: Uuid,
        owner_id: Uuid,
        expires_at: DateTime<Utc>,
    },

    /// An archive (and the organization's remaining data) was purged.
    ArchivePurged {
        archive_id: Uuid,
        organization_id: Uuid,
        purged_at: DateTime<Utc>,
    },

    /// A trashed file was permanently removed.
    FileTrashPurged {
        file_id: Uuid,
        organization_id: Uuid,
        purged_at: DateTime<Utc>,
    },
}

/// Broadcast bus for server events.
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Returns the number of active subscribers the event
    /// reached; zero subscribers is not an error.
    pub fn publish(&self, event: ServerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let reached = bus.publish(ServerEvent::FileTrashPurged {
            file_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            purged_at: Utc::now(),
        });
        assert_eq!(reached, 1);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ServerEvent::FileTrashPurged { .. }));
    }

    #[test]
    fn publish_without_subscribers_is_ok() {
        let bus = EventBus::new();
        let reached = bus.publish(ServerEvent::ArchivePurged {
            archive_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            purged_at: Utc::now(),
        });
        assert_eq!(reached, 0);
    }
}
