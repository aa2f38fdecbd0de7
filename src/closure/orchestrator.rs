use std::{sync::Arc, time::Duration};

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{checker::ClosureChecker, error::ClosureError};
use crate::{
    db::DbPool,
    events::{EventBus, ServerEvent},
    models::{
        Blocker, ClosurePreview, NewArchivedDocument, Organization, OrganizationArchive,
        OrganizationStatus,
    },
    services::PlanResolver,
};

/// Result of a committed closure.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureOutcome {
    pub organization: Organization,
    pub archive: OrganizationArchive,
}

/// Owns organization status transitions and fans out to the registered
/// checkers. Checkers are a flat, fixed-order list; adding a subsystem means
/// registering one more implementation here, nothing else.
pub struct ClosureOrchestrator {
    db: Arc<DbPool>,
    checkers: Vec<Arc<dyn ClosureChecker>>,
    plans: PlanResolver,
    event_bus: Arc<EventBus>,
    checker_timeout: Duration,
}

impl ClosureOrchestrator {
    pub fn new(
        db: Arc<DbPool>,
        checkers: Vec<Arc<dyn ClosureChecker>>,
        plans: PlanResolver,
        event_bus: Arc<EventBus>,
        checker_timeout: Duration,
    ) -> Self {
        Self {
            db,
            checkers,
            plans,
            event_bus,
            checker_timeout,
        }
    }

    pub fn checkers(&self) -> &[Arc<dyn ClosureChecker>] {
        &self.checkers
    }

    /// Fan `check` out to every checker concurrently, each under its own
    /// timeout. A checker that errors or times out must not abort the others;
    /// its failure becomes a synthetic blocking blocker labeled with the
    /// module id so the operator can see which subsystem was uninspectable.
    async fn run_checks(&self, organization_id: Uuid) -> ClosurePreview {
        let checks = self.checkers.iter().map(|checker| {
            let checker = Arc::clone(checker);
            async move {
                let result =
                    tokio::time::timeout(self.checker_timeout, checker.check(organization_id))
                        .await;
                (checker.module_id(), result)
            }
        });

        let mut preview = ClosurePreview::default();
        for (module_id, result) in join_all(checks).await {
            match result {
                Ok(Ok(report)) => {
                    preview.blockers.extend(report.blockers);
                    preview.archivable_data.extend(report.archivable);
                }
                Ok(Err(e)) => {
                    warn!(module_id, error = %e, "Closure checker failed");
                    preview.blockers.push(Blocker::blocking(
                        module_id,
                        "checker_failed",
                        format!("{} could not be inspected", module_id),
                        format!("The {} subsystem reported an error: {}", module_id, e),
                    ));
                }
                Err(_) => {
                    warn!(module_id, timeout = ?self.checker_timeout, "Closure checker timed out");
                    preview.blockers.push(Blocker::blocking(
                        module_id,
                        "checker_timeout",
                        format!("{} could not be inspected", module_id),
                        format!(
                            "The {} subsystem did not respond within {:?}",
                            module_id, self.checker_timeout
                        ),
                    ));
                }
            }
        }
        preview
    }

    /// Load the organization and enforce the owner/state guards shared by
    /// preview and initiate.
    async fn load_guarded(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Organization, ClosureError> {
        let org = self
            .db
            .organizations()
            .get_by_id(organization_id)
            .await?
            .ok_or(ClosureError::NotFound)?;

        if org.owner_id != user_id {
            return Err(ClosureError::Forbidden);
        }

        Ok(org)
    }

    /// Preview what closing the organization would entail. Read-only and
    /// idempotent: callable any number of times without mutating state.
    #[instrument(skip(self))]
    pub async fn get_closure_preview(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<ClosurePreview, ClosureError> {
        let org = self.load_guarded(organization_id, user_id).await?;
        if org.status != OrganizationStatus::Active {
            return Err(ClosureError::AlreadyClosed(org.status));
        }

        Ok(self.run_checks(organization_id).await)
    }

    /// Close the organization: re-check blockers, transition
    /// `active → closing`, create the retention archive, run every checker's
    /// archive phase, and finish with `closing → closed`.
    ///
    /// The commit phase is a best-effort saga, not a transaction: a checker
    /// whose `archive` fails is logged and skipped so the others are not
    /// rolled back. An organization stuck in `closing` (crashed part-way) is
    /// resumed by calling this again; completed steps are skipped because
    /// every one of them is conditional or keyed on already-persisted state.
    #[instrument(skip(self, reason))]
    pub async fn initiate_closing(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        reason: Option<String>,
    ) -> Result<ClosureOutcome, ClosureError> {
        let org = self.load_guarded(organization_id, user_id).await?;

        match org.status {
            OrganizationStatus::Active => {
                // Blockers are re-checked at commit time; a stale preview
                // from the client is never trusted.
                let preview = self.run_checks(organization_id).await;
                if preview.has_blocking() {
                    return Err(ClosureError::CannotClose {
                        blockers: preview.blocking().cloned().collect(),
                    });
                }

                let now = Utc::now();
                if !self.db.organizations().begin_closing(org.id, now).await? {
                    // Lost the race to a concurrent initiate. If that call
                    // crashed mid-way we can still resume; otherwise report
                    // the conflict.
                    let current = self
                        .db
                        .organizations()
                        .get_by_id(org.id)
                        .await?
                        .ok_or(ClosureError::NotFound)?;
                    if current.status != OrganizationStatus::Closing {
                        return Err(ClosureError::AlreadyClosed(current.status));
                    }
                }

                self.commit(org, reason).await
            }
            // Resume a closure that crashed between `closing` and `closed`.
            // The blocker gate already passed when the transition committed.
            OrganizationStatus::Closing => {
                info!(organization_id = %org.id, "Resuming interrupted closure");
                self.commit(org, reason).await
            }
            status => Err(ClosureError::AlreadyClosed(status)),
        }
    }

    /// The commit phase: archive creation, checker fan-out, final status
    /// flip. Idempotent so interrupted closures can be re-driven.
    async fn commit(
        &self,
        org: Organization,
        reason: Option<String>,
    ) -> Result<ClosureOutcome, ClosureError> {
        let archive = match self.db.archives().get_active_for_org(org.id).await? {
            Some(existing) => existing,
            None => {
                let retention = self.plans.archive_retention(&org.plan);
                let expires_at = Utc::now() + retention;
                self.db
                    .archives()
                    .create(org.id, org.owner_id, expires_at)
                    .await?
            }
        };

        // Documents persisted by an earlier interrupted run are kept as-is.
        let existing_docs: Vec<String> = self
            .db
            .archives()
            .list_documents(archive.id)
            .await?
            .into_iter()
            .map(|d| d.source_module_id)
            .collect();

        // Sequential, in registration order, so failure attribution and the
        // audit trail stay ordered. Per-checker failures are logged, not
        // re-thrown: successfully archived checkers are not rolled back.
        for checker in &self.checkers {
            let module_id = checker.module_id();
            if existing_docs.iter().any(|m| m == module_id) {
                continue;
            }

            match checker.archive(org.id, archive.id).await {
                Ok(Some(payload)) => {
                    if let Err(e) = self
                        .db
                        .archives()
                        .add_document(NewArchivedDocument {
                            archive_id: archive.id,
                            source_module_id: module_id.to_string(),
                            payload,
                        })
                        .await
                    {
                        error!(module_id, error = %e, "Failed to persist archived document");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!(module_id, error = %e, "Checker archive phase failed, continuing");
                }
            }
        }

        let closed_at = Utc::now();
        self.db
            .organizations()
            .complete_closing(org.id, reason.as_deref(), closed_at)
            .await?;

        let organization = self
            .db
            .organizations()
            .get_by_id(org.id)
            .await?
            .ok_or(ClosureError::NotFound)?;

        info!(
            organization_id = %org.id,
            archive_id = %archive.id,
            expires_at = %archive.expires_at,
            "Organization closed"
        );
        self.event_bus.publish(ServerEvent::OrganizationClosed {
            organization_id: org.id,
            archive_id: archive.id,
            closed_at,
            expires_at: archive.expires_at,
        });

        Ok(ClosureOutcome {
            organization,
            archive,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::{
        closure::checker::{CheckReport, CheckerError},
        closure::checkers::default_checkers,
        config::RetentionConfig,
        db::tests::harness,
        models::{CreateFile, CreateOrganization, ProjectStatus, VacancyStatus},
        services::{FileStorage, FilesystemFileStorage},
    };

    /// A checker whose check always fails; used to prove failure isolation.
    pub struct FailingChecker;

    #[async_trait]
    impl ClosureChecker for FailingChecker {
        fn module_id(&self) -> &'static str {
            "billing-reports"
        }

        async fn check(&self, _organization_id: Uuid) -> Result<CheckReport, CheckerError> {
            Err(CheckerError::Failed("subsystem unavailable".into()))
        }

        async fn archive(
            &self,
            _organization_id: Uuid,
            _archive_id: Uuid,
        ) -> Result<Option<serde_json::Value>, CheckerError> {
            Ok(None)
        }

        async fn delete_archived(&self, _archive_id: Uuid) -> Result<(), CheckerError> {
            Ok(())
        }
    }

    pub struct TestEnv {
        pub db: Arc<DbPool>,
        pub orchestrator: ClosureOrchestrator,
        pub storage: Arc<dyn FileStorage>,
        pub org: Organization,
        _tmp: tempfile::TempDir,
    }

    pub async fn setup(extra_checkers: Vec<Arc<dyn ClosureChecker>>) -> TestEnv {
        let db = Arc::new(harness::create_db().await);
        let tmp = tempfile::tempdir().unwrap();
        let storage: Arc<dyn FileStorage> = Arc::new(FilesystemFileStorage::new(tmp.path()));

        let mut checkers = default_checkers(db.clone(), storage.clone());
        checkers.extend(extra_checkers);

        let orchestrator = ClosureOrchestrator::new(
            db.clone(),
            checkers,
            PlanResolver::new(RetentionConfig::default()),
            Arc::new(EventBus::new()),
            std::time::Duration::from_secs(5),
        );

        let org = db
            .organizations()
            .create(CreateOrganization {
                owner_id: Uuid::new_v4(),
                slug: "org-1".into(),
                name: "Org One".into(),
                plan: None,
            })
            .await
            .unwrap();

        TestEnv {
            db,
            orchestrator,
            storage,
            org,
            _tmp: tmp,
        }
    }

    #[tokio::test]
    async fn preview_requires_owner() {
        let env = setup(vec![]).await;
        let result = env
            .orchestrator
            .get_closure_preview(env.org.id, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(ClosureError::Forbidden)));
    }

    #[tokio::test]
    async fn preview_of_missing_org_is_not_found() {
        let env = setup(vec![]).await;
        let result = env
            .orchestrator
            .get_closure_preview(Uuid::new_v4(), env.org.owner_id)
            .await;
        assert!(matches!(result, Err(ClosureError::NotFound)));
    }

    #[tokio::test]
    async fn preview_is_read_only_and_repeatable() {
        let env = setup(vec![]).await;
        env.db
            .wallets()
            .upsert_balance(env.org.id, 15000)
            .await
            .unwrap();

        for _ in 0..3 {
            let preview = env
                .orchestrator
                .get_closure_preview(env.org.id, env.org.owner_id)
                .await
                .unwrap();
            assert!(preview.has_blocking());
        }

        // Nothing mutated: the org is still active, no archive exists.
        let org = env.db.organizations().get_by_id(env.org.id).await.unwrap().unwrap();
        assert_eq!(org.status, OrganizationStatus::Active);
        assert!(env.db.archives().get_active_for_org(env.org.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn wallet_balance_blocks_until_settled() {
        let env = setup(vec![]).await;
        env.db
            .wallets()
            .upsert_balance(env.org.id, 15000)
            .await
            .unwrap();

        let result = env
            .orchestrator
            .initiate_closing(env.org.id, env.org.owner_id, None)
            .await;
        match result {
            Err(ClosureError::CannotClose { blockers }) => {
                assert!(blockers.iter().any(|b| b.module_id == "wallet"));
            }
            other => panic!("Expected CannotClose, got {:?}", other.map(|o| o.organization.status)),
        }

        env.db.wallets().upsert_balance(env.org.id, 0).await.unwrap();

        let outcome = env
            .orchestrator
            .initiate_closing(env.org.id, env.org.owner_id, Some("done".into()))
            .await
            .unwrap();
        assert_eq!(outcome.organization.status, OrganizationStatus::Closed);
    }

    #[tokio::test]
    async fn successful_closing_creates_one_archive_with_plan_expiry() {
        let env = setup(vec![]).await;
        let before = Utc::now();

        let outcome = env
            .orchestrator
            .initiate_closing(env.org.id, env.org.owner_id, Some("shutting down".into()))
            .await
            .unwrap();

        let org = env.db.organizations().get_by_id(env.org.id).await.unwrap().unwrap();
        assert_eq!(org.status, OrganizationStatus::Closed);
        assert_eq!(org.closure_reason.as_deref(), Some("shutting down"));
        assert!(org.closed_at.is_some());

        // Default plan retention is 30 days.
        let expected = before + ChronoDuration::days(30);
        let delta = (outcome.archive.expires_at - expected).num_seconds().abs();
        assert!(delta < 60, "expires_at off by {}s", delta);

        // Second call conflicts.
        let result = env
            .orchestrator
            .initiate_closing(env.org.id, env.org.owner_id, None)
            .await;
        assert!(matches!(
            result,
            Err(ClosureError::AlreadyClosed(OrganizationStatus::Closed))
        ));
    }

    #[tokio::test]
    async fn archive_documents_capture_checker_snapshots() {
        let env = setup(vec![]).await;
        env.db
            .projects()
            .create(env.org.id, "Website relaunch", ProjectStatus::Completed)
            .await
            .unwrap();
        env.db
            .vacancies()
            .create(env.org.id, "Senior engineer", VacancyStatus::Closed)
            .await
            .unwrap();
        env.db
            .files()
            .create(CreateFile {
                organization_id: env.org.id,
                uploaded_by: env.org.owner_id,
                filename: "pitch.pdf".into(),
                size_bytes: 512,
                storage_path: format!("{}/pitch.pdf", env.org.id),
            })
            .await
            .unwrap();

        let outcome = env
            .orchestrator
            .initiate_closing(env.org.id, env.org.owner_id, None)
            .await
            .unwrap();

        let docs = env.db.archives().list_documents(outcome.archive.id).await.unwrap();
        let modules: Vec<_> = docs.iter().map(|d| d.source_module_id.as_str()).collect();
        // The wallet never archives; the other three all had data.
        assert_eq!(modules, vec!["projects", "vacancies", "files"]);
    }

    #[tokio::test]
    async fn published_vacancy_blocks_closing() {
        let env = setup(vec![]).await;
        env.db
            .vacancies()
            .create(env.org.id, "Open role", VacancyStatus::Published)
            .await
            .unwrap();

        let result = env
            .orchestrator
            .initiate_closing(env.org.id, env.org.owner_id, None)
            .await;
        match result {
            Err(ClosureError::CannotClose { blockers }) => {
                assert!(blockers.iter().any(|b| b.module_id == "vacancies"));
            }
            _ => panic!("Expected CannotClose"),
        }
    }

    #[tokio::test]
    async fn failing_checker_does_not_hide_other_blockers() {
        let env = setup(vec![Arc::new(FailingChecker)]).await;
        env.db
            .wallets()
            .upsert_balance(env.org.id, 500)
            .await
            .unwrap();

        let preview = env
            .orchestrator
            .get_closure_preview(env.org.id, env.org.owner_id)
            .await
            .unwrap();

        // The wallet blocker survives the other checker's failure, and the
        // failing checker surfaces as a blocking blocker of its own.
        assert!(preview.blockers.iter().any(|b| b.module_id == "wallet"));
        let synthetic = preview
            .blockers
            .iter()
            .find(|b| b.module_id == "billing-reports")
            .expect("failing checker should be reported");
        assert!(synthetic.is_blocking());
    }

    #[tokio::test]
    async fn failing_checker_blocks_initiate() {
        let env = setup(vec![Arc::new(FailingChecker)]).await;
        let result = env
            .orchestrator
            .initiate_closing(env.org.id, env.org.owner_id, None)
            .await;
        match result {
            Err(ClosureError::CannotClose { blockers }) => {
                assert!(blockers.iter().any(|b| b.module_id == "billing-reports"));
            }
            _ => panic!("Expected CannotClose"),
        }
    }

    #[tokio::test]
    async fn interrupted_closing_is_resumable() {
        let env = setup(vec![]).await;

        // Simulate a crash after the closing transition but before commit.
        assert!(
            env.db
                .organizations()
                .begin_closing(env.org.id, Utc::now())
                .await
                .unwrap()
        );

        let outcome = env
            .orchestrator
            .initiate_closing(env.org.id, env.org.owner_id, Some("resume".into()))
            .await
            .unwrap();
        assert_eq!(outcome.organization.status, OrganizationStatus::Closed);

        // And a resumed closure still ends with exactly one archive.
        let archive = env
            .db
            .archives()
            .get_active_for_org(env.org.id)
            .await
            .unwrap()
            .expect("archive should exist");
        assert_eq!(archive.id, outcome.archive.id);
    }

    #[tokio::test]
    async fn preview_rejects_closing_org() {
        let env = setup(vec![]).await;
        env.db
            .organizations()
            .begin_closing(env.org.id, Utc::now())
            .await
            .unwrap();

        let result = env
            .orchestrator
            .get_closure_preview(env.org.id, env.org.owner_id)
            .await;
        assert!(matches!(
            result,
            Err(ClosureError::AlreadyClosed(OrganizationStatus::Closing))
        ));
    }
}
