use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::{
    closure::checker::{CheckReport, CheckerError, ClosureChecker},
    db::DbPool,
    models::{ArchivableItem, Blocker, VacancyStatus},
};

/// Marketplace subsystem checker. Published vacancies must be taken down
/// before closure; the rest is snapshotted and purged with the archive.
pub struct VacanciesChecker {
    db: Arc<DbPool>,
}

impl VacanciesChecker {
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
impl ClosureChecker for VacanciesChecker {
    fn module_id(&self) -> &'static str {
        "vacancies"
    }

    async fn check(&self, organization_id: Uuid) -> Result<CheckReport, CheckerError> {
        let mut report = CheckReport::default();

        let published = self
            .db
            .vacancies()
            .count_by_status(organization_id, VacancyStatus::Published)
            .await?;
        if published > 0 {
            report = report.with_blocker(
                Blocker::blocking(
                    self.module_id(),
                    "published_vacancies",
                    "Published vacancies",
                    format!("{} vacancy(ies) are still visible on the marketplace", published),
                )
                .with_action("Close or unpublish all vacancies before closing"),
            );
        }

        let vacancies = self.db.vacancies().list_for_org(organization_id).await?;
        if !vacancies.is_empty() {
            report = report.with_archivable(ArchivableItem {
                module_id: self.module_id().to_string(),
                label: "Vacancies".to_string(),
                item_count: vacancies.len() as i64,
                detail: json!({
                    "statuses": vacancies
                        .iter()
                        .map(|v| v.status.as_str())
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
        let vacancies = self.db.vacancies().list_for_org(organization_id).await?;
        if vacancies.is_empty() {
            return Ok(None);
        }

        Ok(Some(json!({
            "vacancies": vacancies
                .iter()
                .map(|v| {
                    json!({
                        "id": v.id,
                        "title": v.title,
                        "status": v.status.as_str(),
                        "created_at": v.created_at,
                    })
                })
                .collect::<Vec<_>>(),
        })))
    }

    async fn delete_archived(&self, archive_id: Uuid) -> Result<(), CheckerError> {
        let organization_id = self.organization_for_archive(archive_id).await?;
        let deleted = self.db.vacancies().delete_for_org(organization_id).await?;
        if deleted > 0 {
            tracing::debug!(
                organization_id = %organization_id,
                count = deleted,
                "Deleted archived vacancies"
            );
        }
        Ok(())
    }
}
