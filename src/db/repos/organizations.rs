use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateOrganization, Organization},
};

#[async_trait]
pub trait OrganizationRepo: Send + Sync {
    async fn create(&self, input: CreateOrganization) -> DbResult<Organization>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Organization>>;
    async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Organization>>;

    /// Conditionally transition `active → closing`. Returns false when the
    /// organization was not in `active` (another closure won the race, or it
    /// is already closed).
    async fn begin_closing(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool>;

    /// Conditionally transition `closing → closed`, recording the closure
    /// timestamp and reason. Returns false when the organization was not in
    /// `closing`.
    async fn complete_closing(
        &self,
        id: Uuid,
        reason: Option<&str>,
        closed_at: DateTime<Utc>,
    ) -> DbResult<bool>;

    /// Conditionally transition `closed → deleted` once the retention
    /// archive has been purged. Returns false when not in `closed`.
    async fn mark_deleted(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool>;
}
