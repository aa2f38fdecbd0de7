//! Owner notification boundary.
//!
//! Delivery transports (email, push) live outside this service; the engine
//! publishes to the event bus and logs. The `Notifier` trait is the seam
//! tests use to observe exactly-once delivery.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::events::{EventBus, ServerEvent};

/// An expiry warning addressed to an organization owner.
#[derive(Debug, Clone)]
pub struct ArchiveExpiryNotice {
    pub archive_id: Uuid,
    pub organization_id: Uuid,
    pub owner_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_archive_expiring(&self, notice: ArchiveExpiryNotice)
    -> Result<(), NotifyError>;
}

/// Publishes notices to the event bus for transports to pick up.
pub struct EventBusNotifier {
    bus: Arc<EventBus>,
}

impl EventBusNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Notifier for EventBusNotifier {
    async fn notify_archive_expiring(
        &self,
        notice: ArchiveExpiryNotice,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            archive_id = %notice.archive_id,
            organization_id = %notice.organization_id,
            owner_id = %notice.owner_id,
            expires_at = %notice.expires_at,
            "Archive expiry warning"
        );

        self.bus.publish(ServerEvent::ArchiveExpiring {
            archive_id: notice.archive_id,
            organization_id: notice.organization_id,
            owner_id: notice.owner_id,
            expires_at: notice.expires_at,
        });

        Ok(())
    }
}
