use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_status, parse_uuid};
use crate::{
    db::{error::DbResult, repos::ProjectRepo},
    models::{Project, ProjectStatus},
};

pub struct SqliteProjectRepo {
    pool: SqlitePool,
}

impl SqliteProjectRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_project(row: &SqliteRow) -> DbResult<Project> {
    let status_raw: String = row.get("status");
    let status = parse_status("project status", &status_raw, ProjectStatus::parse)?;

    Ok(Project {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
        name: row.get("name"),
        status,
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl ProjectRepo for SqliteProjectRepo {
    async fn create(
        &self,
        organization_id: Uuid,
        name: &str,
        status: ProjectStatus,
    ) -> DbResult<Project> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO projects (id, organization_id, name, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(name)
        .bind(status.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Project {
            id,
            organization_id,
            name: name.to_string(),
            status,
            created_at: now,
        })
    }

    async fn list_for_org(&self, organization_id: Uuid) -> DbResult<Vec<Project>> {
        let rows = sqlx::query(
            r#"
            SELECT id, organization_id, name, status, created_at
            FROM projects
            WHERE organization_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(organization_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_project).collect()
    }

    async fn count_by_status(
        &self,
        organization_id: Uuid,
        status: ProjectStatus,
    ) -> DbResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM projects WHERE organization_id = ? AND status = ?",
        )
        .bind(organization_id.to_string())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("count"))
    }

    async fn delete_for_org(&self, organization_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM projects WHERE organization_id = ?")
            .bind(organization_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
