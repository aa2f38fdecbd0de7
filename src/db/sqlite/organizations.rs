use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_status, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::OrganizationRepo,
    },
    models::{CreateOrganization, Organization, OrganizationStatus},
};

pub struct SqliteOrganizationRepo {
    pool: SqlitePool,
}

impl SqliteOrganizationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &SqliteRow) -> DbResult<Organization> {
    let status_raw: String = row.get("status");
    let status = parse_status("organization status", &status_raw, OrganizationStatus::parse)?;

    Ok(Organization {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        owner_id: parse_uuid(&row.get::<String, _>("owner_id"))?,
        slug: row.get("slug"),
        name: row.get("name"),
        plan: row.get("plan"),
        status,
        closure_reason: row.get("closure_reason"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        closed_at: row.get("closed_at"),
    })
}

const SELECT_COLUMNS: &str =
    "id, owner_id, slug, name, plan, status, closure_reason, created_at, updated_at, closed_at";

#[async_trait]
impl OrganizationRepo for SqliteOrganizationRepo {
    async fn create(&self, input: CreateOrganization) -> DbResult<Organization> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let plan = input.plan.unwrap_or_else(|| "free".to_string());

        sqlx::query(
            r#"
            INSERT INTO organizations (id, owner_id, slug, name, plan, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'active', ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(input.owner_id.to_string())
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&plan)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!("Organization with slug '{}' already exists", input.slug),
            ),
            _ => DbError::from(e),
        })?;

        Ok(Organization {
            id,
            owner_id: input.owner_id,
            slug: input.slug,
            name: input.name,
            plan,
            status: OrganizationStatus::Active,
            closure_reason: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Organization>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM organizations WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        result.as_ref().map(map_row).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Organization>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM organizations WHERE slug = ?",
            SELECT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        result.as_ref().map(map_row).transpose()
    }

    async fn begin_closing(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET status = 'closing', updated_at = ?
            WHERE id = ? AND status = 'active'
            "#,
        )
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn complete_closing(
        &self,
        id: Uuid,
        reason: Option<&str>,
        closed_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET status = 'closed', closure_reason = ?, closed_at = ?, updated_at = ?
            WHERE id = ? AND status = 'closing'
            "#,
        )
        .bind(reason)
        .bind(closed_at)
        .bind(closed_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_deleted(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET status = 'deleted', updated_at = ?
            WHERE id = ? AND status = 'closed'
            "#,
        )
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
