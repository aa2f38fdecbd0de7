use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_status, parse_uuid};
use crate::{
    db::{error::DbResult, repos::VacancyRepo},
    models::{Vacancy, VacancyStatus},
};

pub struct SqliteVacancyRepo {
    pool: SqlitePool,
}

impl SqliteVacancyRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_vacancy(row: &SqliteRow) -> DbResult<Vacancy> {
    let status_raw: String = row.get("status");
    let status = parse_status("vacancy status", &status_raw, VacancyStatus::parse)?;

    Ok(Vacancy {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
        title: row.get("title"),
        status,
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl VacancyRepo for SqliteVacancyRepo {
    async fn create(
        &self,
        organization_id: Uuid,
        title: &str,
        status: VacancyStatus,
    ) -> DbResult<Vacancy> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO vacancies (id, organization_id, title, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(title)
        .bind(status.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Vacancy {
            id,
            organization_id,
            title: title.to_string(),
            status,
            created_at: now,
        })
    }

    async fn list_for_org(&self, organization_id: Uuid) -> DbResult<Vec<Vacancy>> {
        let rows = sqlx::query(
            r#"
            SELECT id, organization_id, title, status, created_at
            FROM vacancies
            WHERE organization_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(organization_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_vacancy).collect()
    }

    async fn count_by_status(
        &self,
        organization_id: Uuid,
        status: VacancyStatus,
    ) -> DbResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM vacancies WHERE organization_id = ? AND status = ?",
        )
        .bind(organization_id.to_string())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("count"))
    }

    async fn delete_for_org(&self, organization_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM vacancies WHERE organization_id = ?")
            .bind(organization_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
