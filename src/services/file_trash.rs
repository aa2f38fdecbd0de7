use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use super::PlanResolver;
use crate::{
    db::{DbError, DbPool},
    models::{FileTrashEntry, StoredFile},
};

#[derive(Debug, Error)]
pub enum FileTrashError {
    #[error("Organization not found")]
    OrganizationNotFound,

    #[error("File not found: {0}")]
    FileNotFound(Uuid),

    #[error("File {0} is already in the trash")]
    AlreadyTrashed(Uuid),

    #[error("No active trash entry for file {0}")]
    NotInTrash(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type FileTrashResult<T> = Result<T, FileTrashError>;

/// Tombstone/TTL/restore handling for soft-deleted files: the
/// single-subsystem twin of the organization archive saga.
#[derive(Clone)]
pub struct FileTrashService {
    db: Arc<DbPool>,
    plans: PlanResolver,
}

impl FileTrashService {
    pub fn new(db: Arc<DbPool>, plans: PlanResolver) -> Self {
        Self { db, plans }
    }

    /// Soft-delete a file: flag the file row and write the tombstone with a
    /// plan-derived expiry. Infinite retention plans store a NULL expiry.
    #[instrument(skip(self))]
    pub async fn trash(
        &self,
        organization_id: Uuid,
        file_id: Uuid,
        deleted_by: Uuid,
    ) -> FileTrashResult<FileTrashEntry> {
        let org = self
            .db
            .organizations()
            .get_by_id(organization_id)
            .await?
            .ok_or(FileTrashError::OrganizationNotFound)?;

        let file = self
            .db
            .files()
            .get(file_id)
            .await?
            .filter(|f| f.organization_id == organization_id)
            .ok_or(FileTrashError::FileNotFound(file_id))?;

        let now = Utc::now();
        if !self.db.files().mark_deleted(file.id, now).await? {
            return Err(FileTrashError::AlreadyTrashed(file.id));
        }

        let retention = self.plans.trash_retention(&org.plan);
        let entry = FileTrashEntry {
            file_id: file.id,
            organization_id,
            deleted_by,
            deleted_at: now,
            expires_at: retention.map(|d| now + d),
            retention_days: retention.map(|d| d.num_days()),
            restored_at: None,
        };

        let entry = self.db.file_trash().insert(entry).await.map_err(|e| match e {
            DbError::Conflict(_) => FileTrashError::AlreadyTrashed(file.id),
            other => FileTrashError::Database(other),
        })?;

        info!(
            file_id = %file.id,
            organization_id = %organization_id,
            expires_at = ?entry.expires_at,
            "File moved to trash"
        );

        Ok(entry)
    }

    /// Restore a trashed file. The tombstone update is conditional on
    /// `restored_at IS NULL`, so a reaper pass racing this restore cannot
    /// purge the file afterwards.
    #[instrument(skip(self))]
    pub async fn restore(
        &self,
        organization_id: Uuid,
        file_id: Uuid,
    ) -> FileTrashResult<StoredFile> {
        let entry = self
            .db
            .file_trash()
            .get(file_id)
            .await?
            .filter(|e| e.organization_id == organization_id);

        if entry.is_none() {
            return Err(FileTrashError::NotInTrash(file_id));
        }

        if !self.db.file_trash().restore(file_id, Utc::now()).await? {
            // Already restored (idempotent) or purged in the meantime.
            return Err(FileTrashError::NotInTrash(file_id));
        }

        self.db.files().clear_deleted(file_id).await?;

        let file = self
            .db
            .files()
            .get(file_id)
            .await?
            .ok_or(FileTrashError::FileNotFound(file_id))?;

        info!(file_id = %file_id, organization_id = %organization_id, "File restored from trash");
        Ok(file)
    }

    /// Active (unrestored) trash entries for an organization.
    pub async fn list(&self, organization_id: Uuid) -> FileTrashResult<Vec<FileTrashEntry>> {
        Ok(self.db.file_trash().list_active_for_org(organization_id).await?)
    }
}
