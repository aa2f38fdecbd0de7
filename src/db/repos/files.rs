use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateFile, StoredFile},
};

/// Aggregate size of an organization's files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileUsage {
    pub file_count: i64,
    pub total_bytes: i64,
}

#[async_trait]
pub trait FileRepo: Send + Sync {
    async fn create(&self, input: CreateFile) -> DbResult<StoredFile>;
    async fn get(&self, id: Uuid) -> DbResult<Option<StoredFile>>;

    /// Files belonging to an organization. `include_deleted` controls
    /// whether soft-deleted (trashed) files appear.
    async fn list_for_org(
        &self,
        organization_id: Uuid,
        include_deleted: bool,
    ) -> DbResult<Vec<StoredFile>>;

    async fn usage_for_org(&self, organization_id: Uuid) -> DbResult<FileUsage>;

    /// Set the soft-delete marker. Conditional on the file not already being
    /// trashed; returns false otherwise.
    async fn mark_deleted(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool>;

    /// Clear the soft-delete marker on restore.
    async fn clear_deleted(&self, id: Uuid) -> DbResult<bool>;

    /// Hard-delete a single file row.
    async fn delete(&self, id: Uuid) -> DbResult<bool>;

    /// Hard-delete all of an organization's file rows. Returns the count.
    async fn delete_for_org(&self, organization_id: Uuid) -> DbResult<u64>;
}
