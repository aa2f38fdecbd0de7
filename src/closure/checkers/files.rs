use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::{
    closure::checker::{CheckReport, CheckerError, ClosureChecker},
    db::DbPool,
    models::{ArchivableItem, Blocker},
    services::FileStorage,
};

/// File storage subsystem checker.
///
/// Files never block closure; the checker records a manifest of the
/// organization's files in the archive and, at purge time, deletes blobs
/// before rows so an interrupted purge can always be re-run.
pub struct FilesChecker {
    db: Arc<DbPool>,
    storage: Arc<dyn FileStorage>,
}

impl FilesChecker {
    pub fn new(db: Arc<DbPool>, storage: Arc<dyn FileStorage>) -> Self {
        Self { db, storage }
    }

    async fn organization_for_archive(&self, archive_id: Uuid) -> Result<Uuid, CheckerError> {
        let archive = self
            .db
            .archives()
            .get_by_id(archive_id)
            .await?
            .ok_or_else(|| CheckerError::Failed(format!("Archive {} not found", archive_id)))?;
        Ok(archive.organization_id)
    }
}

#[async_trait]
impl ClosureChecker for FilesChecker {
    fn module_id(&self) -> &'static str {
        "files"
    }

    async fn check(&self, organization_id: Uuid) -> Result<CheckReport, CheckerError> {
        let mut report = CheckReport::default();

        let usage = self.db.files().usage_for_org(organization_id).await?;
        if usage.file_count > 0 {
            report = report
                .with_blocker(Blocker::warning(
                    self.module_id(),
                    "stored_files",
                    "Stored files",
                    format!(
                        "{} file(s) totalling {} bytes will be archived and eventually deleted",
                        usage.file_count, usage.total_bytes
                    ),
                ))
                .with_archivable(ArchivableItem {
                    module_id: self.module_id().to_string(),
                    label: "Files".to_string(),
                    item_count: usage.file_count,
                    detail: json!({ "total_bytes": usage.total_bytes }),
                });
        }

        Ok(report)
    }

    async fn archive(
        &self,
        organization_id: Uuid,
        _archive_id: Uuid,
    ) -> Result<Option<serde_json::Value>, CheckerError> {
        let files = self.db.files().list_for_org(organization_id, true).await?;
        if files.is_empty() {
            return Ok(None);
        }

        Ok(Some(json!({
            "files": files
                .iter()
                .map(|f| {
                    json!({
                        "id": f.id,
                        "filename": f.filename,
                        "size_bytes": f.size_bytes,
                        "storage_path": f.storage_path,
                        "trashed": f.is_trashed(),
                    })
                })
                .collect::<Vec<_>>(),
        })))
    }

    async fn delete_archived(&self, archive_id: Uuid) -> Result<(), CheckerError> {
        let organization_id = self.organization_for_archive(archive_id).await?;
        let files = self.db.files().list_for_org(organization_id, true).await?;

        // Blobs first: a blob-delete failure leaves the rows in place so the
        // next reaper pass retries. Blob deletion is a no-op when the blob is
        // already gone.
        for file in &files {
            self.storage.delete(&file.storage_path).await?;
        }

        let tombstones = self.db.file_trash().delete_for_org(organization_id).await?;
        let rows = self.db.files().delete_for_org(organization_id).await?;
        if rows > 0 || tombstones > 0 {
            tracing::debug!(
                organization_id = %organization_id,
                files = rows,
                tombstones = tombstones,
                "Deleted archived files"
            );
        }

        Ok(())
    }
}
