use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{Vacancy, VacancyStatus},
};

#[async_trait]
pub trait VacancyRepo: Send + Sync {
    async fn create(
        &self,
        organization_id: Uuid,
        title: &str,
        status: VacancyStatus,
    ) -> DbResult<Vacancy>;

    async fn list_for_org(&self, organization_id: Uuid) -> DbResult<Vec<Vacancy>>;
    async fn count_by_status(&self, organization_id: Uuid, status: VacancyStatus)
    -> DbResult<i64>;

    /// Hard-delete all of an organization's vacancies. Returns the count.
    async fn delete_for_org(&self, organization_id: Uuid) -> DbResult<u64>;
}
