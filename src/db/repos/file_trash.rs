use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{db::error::DbResult, models::FileTrashEntry};

/// Persistence for file tombstones. All mutating operations are conditional
/// so a reaper racing a restore degrades to a no-op.
#[async_trait]
pub trait FileTrashRepo: Send + Sync {
    /// Insert a tombstone. Fails with a conflict when an unrestored entry
    /// already exists for the file.
    async fn insert(&self, entry: FileTrashEntry) -> DbResult<FileTrashEntry>;

    async fn get(&self, file_id: Uuid) -> DbResult<Option<FileTrashEntry>>;

    /// Unrestored entries for an organization, most recently trashed first.
    async fn list_active_for_org(&self, organization_id: Uuid) -> DbResult<Vec<FileTrashEntry>>;

    /// Entries the reaper may purge: finite `expires_at < now`, not restored.
    async fn list_due(&self, now: DateTime<Utc>, limit: i64) -> DbResult<Vec<FileTrashEntry>>;

    /// Mark an entry restored. `UPDATE ... WHERE restored_at IS NULL`:
    /// returns false when there is no unrestored entry for the file.
    async fn restore(&self, file_id: Uuid, now: DateTime<Utc>) -> DbResult<bool>;

    /// Remove a tombstone after its blob was deleted. Conditional on the
    /// entry still being unrestored; returns false when a restore won.
    async fn purge(&self, file_id: Uuid) -> DbResult<bool>;

    /// Remove all tombstones for an organization, restored or not. Used when
    /// the organization itself is purged. Returns the count.
    async fn delete_for_org(&self, organization_id: Uuid) -> DbResult<u64>;
}
