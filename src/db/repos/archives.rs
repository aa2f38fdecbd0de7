use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{ArchivedDocument, NewArchivedDocument, OrganizationArchive},
};

/// Persistence for the teardown saga log and the serialized payloads the
/// checkers produced.
#[async_trait]
pub trait ArchiveRepo: Send + Sync {
    /// Create the archive row for a closing organization. Fails with a
    /// conflict if an active archive already exists for the org (enforced by
    /// a partial unique index).
    async fn create(
        &self,
        organization_id: Uuid,
        owner_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> DbResult<OrganizationArchive>;

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<OrganizationArchive>>;
    async fn get_active_for_org(&self, organization_id: Uuid)
    -> DbResult<Option<OrganizationArchive>>;

    /// Active archives whose `expires_at` falls inside `(now, window_end]`:
    /// candidates for an expiry warning.
    async fn list_expiring(
        &self,
        now: DateTime<Utc>,
        window_end: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<OrganizationArchive>>;

    /// Archives due for purge: `expires_at < now` and status `active`, plus
    /// `expired` archives left behind by a failed or interrupted purge.
    async fn list_due(&self, now: DateTime<Utc>, limit: i64)
    -> DbResult<Vec<OrganizationArchive>>;

    /// Claim today's expiry notification. Conditional update keyed on the
    /// UTC calendar day: returns false when the archive is no longer active
    /// or was already notified on or after `day_start`.
    async fn claim_notification(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        day_start: DateTime<Utc>,
    ) -> DbResult<bool>;

    /// Claim a due archive for purging (`active → expired`). Returns false
    /// when another reaper pass already claimed it.
    async fn claim_for_purge(&self, id: Uuid) -> DbResult<bool>;

    /// Finish a purge (`expired → deleted`). Returns false when the archive
    /// was not in `expired`.
    async fn mark_deleted(&self, id: Uuid) -> DbResult<bool>;

    async fn add_document(&self, doc: NewArchivedDocument) -> DbResult<ArchivedDocument>;
    async fn list_documents(&self, archive_id: Uuid) -> DbResult<Vec<ArchivedDocument>>;
    async fn delete_documents(&self, archive_id: Uuid) -> DbResult<u64>;
}
