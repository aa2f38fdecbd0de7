use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{Project, ProjectStatus},
};

#[async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn create(
        &self,
        organization_id: Uuid,
        name: &str,
        status: ProjectStatus,
    ) -> DbResult<Project>;

    async fn list_for_org(&self, organization_id: Uuid) -> DbResult<Vec<Project>>;
    async fn count_by_status(&self, organization_id: Uuid, status: ProjectStatus)
    -> DbResult<i64>;

    /// Hard-delete all of an organization's projects. Returns the count.
    async fn delete_for_org(&self, organization_id: Uuid) -> DbResult<u64>;
}
