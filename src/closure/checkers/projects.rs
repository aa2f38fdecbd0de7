use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::{
    closure::checker::{CheckReport, CheckerError, ClosureChecker},
    db::DbPool,
    models::{ArchivableItem, Blocker, ProjectStatus},
};

/// Projects subsystem checker. Active projects block closure; everything
/// else is snapshotted into the archive and hard-deleted at purge time.
pub struct ProjectsChecker {
    db: Arc<DbPool>,
}

impl ProjectsChecker {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
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
impl ClosureChecker for ProjectsChecker {
    fn module_id(&self) -> &'static str {
        "projects"
    }

    async fn check(&self, organization_id: Uuid) -> Result<CheckReport, CheckerError> {
        let mut report = CheckReport::default();

        let active = self
            .db
            .projects()
            .count_by_status(organization_id, ProjectStatus::Active)
            .await?;
        if active > 0 {
            report = report.with_blocker(
                Blocker::blocking(
                    self.module_id(),
                    "active_projects",
                    "Active projects",
                    format!("{} project(s) are still active", active),
                )
                .with_action("Complete or archive all active projects before closing"),
            );
        }

        let drafts = self
            .db
            .projects()
            .count_by_status(organization_id, ProjectStatus::Draft)
            .await?;
        if drafts > 0 {
            report = report.with_blocker(Blocker::warning(
                self.module_id(),
                "draft_projects",
                "Draft projects",
                format!("{} draft project(s) will be archived and eventually deleted", drafts),
            ));
        }

        let projects = self.db.projects().list_for_org(organization_id).await?;
        if !projects.is_empty() {
            report = report.with_archivable(ArchivableItem {
                module_id: self.module_id().to_string(),
                label: "Projects".to_string(),
                item_count: projects.len() as i64,
                detail: json!({
                    "statuses": projects
                        .iter()
                        .map(|p| p.status.as_str())
                        .collect::<Vec<_>>(),
                }),
            });
        }

        Ok(report)
    }

    async fn archive(
        &self,
        organization_id: Uuid,
        _archive_id: Uuid,
    ) -> Result<Option<serde_json::Value>, CheckerError> {
        let projects = self.db.projects().list_for_org(organization_id).await?;
        if projects.is_empty() {
            return Ok(None);
        }

        Ok(Some(json!({
            "projects": projects
                .iter()
                .map(|p| {
                    json!({
                        "id": p.id,
                        "name": p.name,
                        "status": p.status.as_str(),
                        "created_at": p.created_at,
                    })
                })
                .collect::<Vec<_>>(),
        })))
    }

    async fn delete_archived(&self, archive_id: Uuid) -> Result<(), CheckerError> {
        let organization_id = self.organization_for_archive(archive_id).await?;
        let deleted = self.db.projects().delete_for_org(organization_id).await?;
        if deleted > 0 {
            tracing::debug!(
                organization_id = %organization_id,
                count = deleted,
                "Deleted archived projects"
            );
        }
        Ok(())
    }
}
