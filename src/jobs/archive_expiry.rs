//! Expiry notification job: warns owners before their archive is purged.

use std::{sync::Arc, time::Instant};

use chrono::{NaiveTime, Utc};
use serde::Serialize;

use crate::{
    config::WorkersConfig,
    db::{DbPool, DbResult},
    services::{ArchiveExpiryNotice, Notifier, PlanResolver},
};

/// Results from a single notification pass.
#[derive(Debug, Default, Serialize)]
pub struct NotifyRunResult {
    /// Archives inside the notification window.
    pub scanned: u64,
    /// Notifications actually sent this pass.
    pub notified: u64,
    /// Archives already notified today (or claimed by a concurrent pass).
    pub skipped: u64,
    /// Delivery failures.
    pub failed: u64,
    /// Duration of the pass in milliseconds.
    pub duration_ms: u64,
}

/// Run a single notification pass.
///
/// The notification is claimed via a conditional update on `notified_at`
/// keyed to the UTC calendar day before anything is sent, so re-running the
/// job the same day (or two schedulers racing) sends at most one warning per
/// archive.
pub async fn run_expiry_notification(
    db: &DbPool,
    notifier: &dyn Notifier,
    plans: &PlanResolver,
    batch_size: i64,
) -> DbResult<NotifyRunResult> {
    let start = Instant::now();
    let mut result = NotifyRunResult::default();

    let now = Utc::now();
    let window_end = now + plans.notify_window();
    let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();

    let expiring = db.archives().list_expiring(now, window_end, batch_size).await?;

    for archive in expiring {
        result.scanned += 1;

        // Skip archives already notified in this calendar-day period.
        if let Some(notified_at) = archive.notified_at
            && notified_at >= day_start
        {
            result.skipped += 1;
            continue;
        }

        if !db
            .archives()
            .claim_notification(archive.id, now, day_start)
            .await?
        {
            // A concurrent pass claimed it between the scan and here.
            result.skipped += 1;
            continue;
        }

        let notice = ArchiveExpiryNotice {
            archive_id: archive.id,
            organization_id: archive.organization_id,
            owner_id: archive.owner_id,
            expires_at: archive.expires_at,
        };

        match notifier.notify_archive_expiring(notice).await {
            Ok(()) => result.notified += 1,
            Err(e) => {
                // The claim is kept: the owner gets the next daily warning
                // rather than a burst of retries.
                tracing::error!(
                    archive_id = %archive.id,
                    error = %e,
                    "Failed to deliver expiry notification"
                );
                result.failed += 1;
            }
        }
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    Ok(result)
}

/// Starts the expiry notifier as a background task. Runs until the shutdown
/// token is cancelled; a pass in flight finishes first.
pub async fn start_expiry_notifier_worker(
    db: Arc<DbPool>,
    notifier: Arc<dyn Notifier>,
    plans: PlanResolver,
    config: WorkersConfig,
    shutdown: tokio_util::sync::CancellationToken,
) {
    tracing::info!(
        interval_hours = config.notify_interval_hours,
        batch_size = config.batch_size,
        "Starting archive expiry notifier"
    );

    let interval = config.notify_interval();

    loop {
        match run_expiry_notification(&db, notifier.as_ref(), &plans, config.batch_size).await {
            Ok(result) if result.notified > 0 || result.failed > 0 => {
                tracing::info!(
                    scanned = result.scanned,
                    notified = result.notified,
                    skipped = result.skipped,
                    failed = result.failed,
                    duration_ms = result.duration_ms,
                    "Expiry notification pass complete"
                );
            }
            Ok(_) => {
                tracing::debug!("Expiry notification pass complete, nothing to send");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running expiry notification pass");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Archive expiry notifier stopping");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::RetentionConfig,
        db::tests::harness,
        models::CreateOrganization,
        services::NotifyError,
    };

    /// Records every notice it receives.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<ArchiveExpiryNotice>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify_archive_expiring(
            &self,
            notice: ArchiveExpiryNotice,
        ) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Delivery("smtp down".into()));
            }
            self.sent.lock().unwrap().push(notice);
            Ok(())
        }
    }

    async fn seed_archive(db: &DbPool, expires_in: Duration) -> Uuid {
        let org = db
            .organizations()
            .create(CreateOrganization {
                owner_id: Uuid::new_v4(),
                slug: format!("org-{}", Uuid::new_v4().simple()),
                name: "Notify Org".into(),
                plan: None,
            })
            .await
            .unwrap();
        db.archives()
            .create(org.id, org.owner_id, Utc::now() + expires_in)
            .await
            .unwrap()
            .id
    }

    fn plans() -> PlanResolver {
        PlanResolver::new(RetentionConfig::default())
    }

    #[tokio::test]
    async fn notifies_once_per_day() {
        let db = harness::create_db().await;
        let archive_id = seed_archive(&db, Duration::days(3)).await;
        let notifier = RecordingNotifier::default();

        // Three invocations within the same calendar day.
        for _ in 0..3 {
            run_expiry_notification(&db, &notifier, &plans(), 100)
                .await
                .unwrap();
        }

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].archive_id, archive_id);
    }

    #[tokio::test]
    async fn archives_outside_window_are_ignored() {
        let db = harness::create_db().await;
        seed_archive(&db, Duration::days(30)).await;
        let notifier = RecordingNotifier::default();

        let result = run_expiry_notification(&db, &notifier, &plans(), 100)
            .await
            .unwrap();
        assert_eq!(result.scanned, 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_counted_not_silent() {
        let db = harness::create_db().await;
        seed_archive(&db, Duration::days(2)).await;
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };

        let result = run_expiry_notification(&db, &notifier, &plans(), 100)
            .await
            .unwrap();
        assert_eq!(result.failed, 1);
        assert_eq!(result.notified, 0);
    }
}
