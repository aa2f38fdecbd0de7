//! Archive cleanup job: purges archives whose retention window elapsed.

use std::{sync::Arc, time::Instant};

use chrono::Utc;
use serde::Serialize;

use crate::{
    closure::ClosureChecker,
    config::WorkersConfig,
    db::{DbPool, DbResult},
    events::{EventBus, ServerEvent},
    models::ArchiveStatus,
};

/// Results from a single cleanup pass.
#[derive(Debug, Default, Serialize)]
pub struct ArchiveCleanupResult {
    /// Archives past their expiry found by the scan.
    pub scanned: u64,
    /// Archives fully purged this pass.
    pub archives_purged: u64,
    /// Archived document rows removed.
    pub documents_deleted: u64,
    /// Organizations flipped to deleted after their archive was purged.
    pub organizations_deleted: u64,
    /// Archives whose purge failed and was left for the next pass.
    pub failed: u64,
    /// Archives claimed by a concurrent pass.
    pub skipped: u64,
    /// Duration of the pass in milliseconds.
    pub duration_ms: u64,
}

impl ArchiveCleanupResult {
    pub fn has_deletions(&self) -> bool {
        self.archives_purged > 0 || self.documents_deleted > 0
    }
}

/// Run a single cleanup pass.
///
/// Each due archive is claimed (`active → expired`) before any destructive
/// work, so overlapping passes cannot purge the same archive twice. Every
/// registered checker's `delete_archived` must succeed before the document
/// rows and the archive itself are dropped; on any checker failure the
/// archive stays claimed and the next pass retries, which is why
/// `delete_archived` must be idempotent.
pub async fn run_archive_cleanup(
    db: &DbPool,
    checkers: &[Arc<dyn ClosureChecker>],
    event_bus: &EventBus,
    batch_size: i64,
) -> DbResult<ArchiveCleanupResult> {
    let start = Instant::now();
    let mut result = ArchiveCleanupResult::default();

    let now = Utc::now();
    let due = db.archives().list_due(now, batch_size).await?;

    for archive in due {
        result.scanned += 1;

        // Claim fresh archives; archives already in `expired` are leftovers
        // from a failed or interrupted purge and are retried without a claim.
        if archive.status == ArchiveStatus::Active
            && !db.archives().claim_for_purge(archive.id).await?
        {
            result.skipped += 1;
            continue;
        }

        // Sequential, registration order; abort this archive on the first
        // failure so attribution stays clean and nothing is half-reported.
        let mut purge_failed = false;
        for checker in checkers {
            if let Err(e) = checker.delete_archived(archive.id).await {
                tracing::error!(
                    archive_id = %archive.id,
                    organization_id = %archive.organization_id,
                    module_id = checker.module_id(),
                    error = %e,
                    "Checker purge failed, leaving archive for retry"
                );
                purge_failed = true;
                break;
            }
        }
        if purge_failed {
            result.failed += 1;
            continue;
        }

        result.documents_deleted += db.archives().delete_documents(archive.id).await?;

        if db.archives().mark_deleted(archive.id).await? {
            result.archives_purged += 1;
        }

        if db
            .organizations()
            .mark_deleted(archive.organization_id, now)
            .await?
        {
            result.organizations_deleted += 1;
        }

        tracing::info!(
            archive_id = %archive.id,
            organization_id = %archive.organization_id,
            "Archive purged"
        );
        event_bus.publish(ServerEvent::ArchivePurged {
            archive_id: archive.id,
            organization_id: archive.organization_id,
            purged_at: Utc::now(),
        });
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    Ok(result)
}

/// Starts the archive cleaner as a background task. Runs until the shutdown
/// token is cancelled; a pass in flight finishes first.
pub async fn start_archive_cleanup_worker(
    db: Arc<DbPool>,
    checkers: Vec<Arc<dyn ClosureChecker>>,
    event_bus: Arc<EventBus>,
    config: WorkersConfig,
    shutdown: tokio_util::sync::CancellationToken,
) {
    tracing::info!(
        interval_hours = config.cleanup_interval_hours,
        batch_size = config.batch_size,
        "Starting archive cleanup worker"
    );

    let interval = config.cleanup_interval();

    loop {
        match run_archive_cleanup(&db, &checkers, &event_bus, config.batch_size).await {
            Ok(result) if result.has_deletions() || result.failed > 0 => {
                tracing::info!(
                    scanned = result.scanned,
                    archives = result.archives_purged,
                    documents = result.documents_deleted,
                    organizations = result.organizations_deleted,
                    failed = result.failed,
                    duration_ms = result.duration_ms,
                    "Archive cleanup pass complete"
                );
            }
            Ok(_) => {
                tracing::debug!("Archive cleanup pass complete, nothing to clean up");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running archive cleanup pass");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Archive cleanup worker stopping");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
