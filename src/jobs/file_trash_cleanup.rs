//! File-trash cleanup job: the single-subsystem twin of the archive cleaner.

use std::{sync::Arc, time::Instant};

use chrono::Utc;
use serde::Serialize;

use crate::{
    config::WorkersConfig,
    db::{DbPool, DbResult},
    events::{EventBus, ServerEvent},
    services::FileStorage,
};

/// Results from a single trash cleanup pass.
#[derive(Debug, Default, Serialize)]
pub struct TrashCleanupResult {
    /// Due tombstones found by the scan.
    pub scanned: u64,
    /// Files fully purged (blob + rows).
    pub purged: u64,
    /// Rows whose blob deletion failed, left for retry.
    pub failed: u64,
    /// Rows skipped because a restore won the race mid-pass.
    pub skipped: u64,
    /// Duration of the pass in milliseconds.
    pub duration_ms: u64,
}

/// Run a single trash cleanup pass.
///
/// Per entry: blob first, then the tombstone, then the file row. A storage
/// failure aborts only that entry; the tombstone stays and the next pass
/// retries (blob deletion is a no-op when the blob is already gone). The
/// tombstone removal is conditional on `restored_at IS NULL`, so a restore
/// committed before this pass keeps its file.
pub async fn run_file_trash_cleanup(
    db: &DbPool,
    storage: &dyn FileStorage,
    event_bus: &EventBus,
    batch_size: i64,
) -> DbResult<TrashCleanupResult> {
    let start = Instant::now();
    let mut result = TrashCleanupResult::default();

    let now = Utc::now();
    let due = db.file_trash().list_due(now, batch_size).await?;

    for entry in due {
        result.scanned += 1;

        // The file row may already be gone from an interrupted pass; the
        // tombstone alone is then left to remove.
        let file = db.files().get(entry.file_id).await?;

        if let Some(ref file) = file
            && let Err(e) = storage.delete(&file.storage_path).await
        {
            tracing::error!(
                file_id = %entry.file_id,
                storage_path = %file.storage_path,
                error = %e,
                "Failed to delete file blob, leaving trash entry for retry"
            );
            result.failed += 1;
            continue;
        }

        if !db.file_trash().purge(entry.file_id).await? {
            // A restore slipped in between the scan and the purge. The row
            // survives; the blob may already be gone, which is surfaced
            // rather than silently ignored.
            tracing::warn!(
                file_id = %entry.file_id,
                "Restore won the race against the trash reaper, keeping file row"
            );
            result.skipped += 1;
            continue;
        }

        if file.is_some() {
            db.files().delete(entry.file_id).await?;
        }

        tracing::debug!(
            file_id = %entry.file_id,
            organization_id = %entry.organization_id,
            "Trashed file purged"
        );
        event_bus.publish(ServerEvent::FileTrashPurged {
            file_id: entry.file_id,
            organization_id: entry.organization_id,
            purged_at: Utc::now(),
        });
        result.purged += 1;
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    Ok(result)
}

/// Starts the file-trash cleaner as a background task. Runs until the
/// shutdown token is cancelled; a pass in flight finishes first.
pub async fn start_file_trash_cleanup_worker(
    db: Arc<DbPool>,
    storage: Arc<dyn FileStorage>,
    event_bus: Arc<EventBus>,
    config: WorkersConfig,
    shutdown: tokio_util::sync::CancellationToken,
) {
    tracing::info!(
        interval_hours = config.trash_interval_hours,
        batch_size = config.batch_size,
        "Starting file trash cleanup worker"
    );

    let interval = config.trash_interval();

    loop {
        match run_file_trash_cleanup(&db, storage.as_ref(), &event_bus, config.batch_size).await {
            Ok(result) if result.purged > 0 || result.failed > 0 => {
                tracing::info!(
                    scanned = result.scanned,
                    purged = result.purged,
                    failed = result.failed,
                    skipped = result.skipped,
                    duration_ms = result.duration_ms,
                    "File trash cleanup pass complete"
                );
            }
            Ok(_) => {
                tracing::debug!("File trash cleanup pass complete, nothing to purge");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running file trash cleanup pass");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("File trash cleanup worker stopping");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::tests::harness,
        models::{CreateFile, CreateOrganization, FileTrashEntry},
        services::{FileStorageError, FileStorageResult, FilesystemFileStorage},
    };

    struct Env {
        db: Arc<DbPool>,
        storage: FilesystemFileStorage,
        event_bus: EventBus,
        _tmp: tempfile::TempDir,
    }

    async fn setup() -> Env {
        let db = Arc::new(harness::create_db().await);
        let tmp = tempfile::tempdir().unwrap();
        let storage = FilesystemFileStorage::new(tmp.path());
        Env {
            db,
            storage,
            event_bus: EventBus::new(),
            _tmp: tmp,
        }
    }

    /// Seed an org with one trashed file whose blob exists on disk.
    async fn seed_trashed_file(env: &Env, expires_in: Duration) -> (Uuid, String) {
        let org = env
            .db
            .organizations()
            .create(CreateOrganization {
                owner_id: Uuid::new_v4(),
                slug: format!("org-{}", Uuid::new_v4().simple()),
                name: "Trash Org".into(),
                plan: None,
            })
            .await
            .unwrap();

        let storage_path = format!("{}/old.bin", org.id);
        env.storage.store(&storage_path, b"bytes").await.unwrap();

        let file = env
            .db
            .files()
            .create(CreateFile {
                organization_id: org.id,
                uploaded_by: org.owner_id,
                filename: "old.bin".into(),
                size_bytes: 5,
                storage_path: storage_path.clone(),
            })
            .await
            .unwrap();

        let now = Utc::now();
        env.db.files().mark_deleted(file.id, now).await.unwrap();
        env.db
            .file_trash()
            .insert(FileTrashEntry {
                file_id: file.id,
                organization_id: org.id,
                deleted_by: org.owner_id,
                deleted_at: now,
                expires_at: Some(now + expires_in),
                retention_days: Some(expires_in.num_days()),
                restored_at: None,
            })
            .await
            .unwrap();

        (file.id, storage_path)
    }

    #[tokio::test]
    async fn purges_due_entries_blob_and_rows() {
        let env = setup().await;
        let (file_id, storage_path) = seed_trashed_file(&env, Duration::days(-1)).await;

        let result = run_file_trash_cleanup(&env.db, &env.storage, &env.event_bus, 100)
            .await
            .unwrap();
        assert_eq!(result.purged, 1);

        assert!(!env.storage.exists(&storage_path).await.unwrap());
        assert!(env.db.files().get(file_id).await.unwrap().is_none());
        assert!(env.db.file_trash().get(file_id).await.unwrap().is_none());

        // Idempotent: a second pass finds nothing.
        let result = run_file_trash_cleanup(&env.db, &env.storage, &env.event_bus, 100)
            .await
            .unwrap();
        assert_eq!(result.scanned, 0);
    }

    #[tokio::test]
    async fn restored_entries_are_never_purged() {
        let env = setup().await;
        // Expiry one second away, then restored just before it passes.
        let (file_id, storage_path) = seed_trashed_file(&env, Duration::seconds(1)).await;
        env.db.file_trash().restore(file_id, Utc::now()).await.unwrap();
        env.db.files().clear_deleted(file_id).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let result = run_file_trash_cleanup(&env.db, &env.storage, &env.event_bus, 100)
            .await
            .unwrap();
        assert_eq!(result.purged, 0);

        // The file is visible and its blob untouched.
        let file = env.db.files().get(file_id).await.unwrap().unwrap();
        assert!(!file.is_trashed());
        assert!(env.storage.exists(&storage_path).await.unwrap());
    }

    #[tokio::test]
    async fn entries_before_expiry_are_left_alone() {
        let env = setup().await;
        let (file_id, _) = seed_trashed_file(&env, Duration::days(7)).await;

        let result = run_file_trash_cleanup(&env.db, &env.storage, &env.event_bus, 100)
            .await
            .unwrap();
        assert_eq!(result.scanned, 0);
        assert!(env.db.file_trash().get(file_id).await.unwrap().is_some());
    }

    /// Storage stub that refuses every delete.
    struct RefusingStorage;

    #[async_trait]
    impl FileStorage for RefusingStorage {
        fn backend_name(&self) -> &'static str {
            "refusing"
        }

        async fn store(&self, _path: &str, _content: &[u8]) -> FileStorageResult<()> {
            Ok(())
        }

        async fn delete(&self, path: &str) -> FileStorageResult<()> {
            Err(FileStorageError::InvalidPath(path.to_string()))
        }

        async fn exists(&self, _path: &str) -> FileStorageResult<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn storage_failure_aborts_only_that_row() {
        let env = setup().await;
        let (file_id, _) = seed_trashed_file(&env, Duration::days(-1)).await;

        let result = run_file_trash_cleanup(&env.db, &RefusingStorage, &env.event_bus, 100)
            .await
            .unwrap();
        assert_eq!(result.failed, 1);
        assert_eq!(result.purged, 0);

        // Entry and file row survive for the next pass.
        assert!(env.db.file_trash().get(file_id).await.unwrap().is_some());
        assert!(env.db.files().get(file_id).await.unwrap().is_some());

        // The next pass with working storage finishes the job.
        let result = run_file_trash_cleanup(&env.db, &env.storage, &env.event_bus, 100)
            .await
            .unwrap();
        assert_eq!(result.purged, 1);
    }
}
