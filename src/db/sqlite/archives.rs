use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_status, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ArchiveRepo,
    },
    models::{ArchiveStatus, ArchivedDocument, NewArchivedDocument, OrganizationArchive},
};

pub struct SqliteArchiveRepo {
    pool: SqlitePool,
}

impl SqliteArchiveRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_archive(row: &SqliteRow) -> DbResult<OrganizationArchive> {
    let status_raw: String = row.get("status");
    let status = parse_status("archive status", &status_raw, ArchiveStatus::parse)?;

    Ok(OrganizationArchive {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
        owner_id: parse_uuid(&row.get::<String, _>("owner_id"))?,
        status,
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
        notified_at: row.get("notified_at"),
    })
}

fn map_document(row: &SqliteRow) -> DbResult<ArchivedDocument> {
    let payload_raw: String = row.get("payload");
    let payload = serde_json::from_str(&payload_raw)?;

    Ok(ArchivedDocument {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        archive_id: parse_uuid(&row.get::<String, _>("archive_id"))?,
        source_module_id: row.get("source_module_id"),
        payload,
        created_at: row.get("created_at"),
    })
}

const ARCHIVE_COLUMNS: &str =
    "id, organization_id, owner_id, status, created_at, expires_at, notified_at";

#[async_trait]
impl ArchiveRepo for SqliteArchiveRepo {
    async fn create(
        &self,
        organization_id: Uuid,
        owner_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> DbResult<OrganizationArchive> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO organization_archives (id, organization_id, owner_id, status, created_at, expires_at)
            VALUES (?, ?, ?, 'active', ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(owner_id.to_string())
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!(
                    "An active archive already exists for organization {}",
                    organization_id
                ),
            ),
            _ => DbError::from(e),
        })?;

        Ok(OrganizationArchive {
            id,
            organization_id,
            owner_id,
            status: ArchiveStatus::Active,
            created_at: now,
            expires_at,
            notified_at: None,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<OrganizationArchive>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM organization_archives WHERE id = ?",
            ARCHIVE_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        result.as_ref().map(map_archive).transpose()
    }

    async fn get_active_for_org(
        &self,
        organization_id: Uuid,
    ) -> DbResult<Option<OrganizationArchive>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM organization_archives WHERE organization_id = ? AND status = 'active'",
            ARCHIVE_COLUMNS
        ))
        .bind(organization_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        result.as_ref().map(map_archive).transpose()
    }

    async fn list_expiring(
        &self,
        now: DateTime<Utc>,
        window_end: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<OrganizationArchive>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM organization_archives
            WHERE status = 'active' AND expires_at > ? AND expires_at <= ?
            ORDER BY expires_at ASC
            LIMIT ?
            "#,
            ARCHIVE_COLUMNS
        ))
        .bind(now)
        .bind(window_end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_archive).collect()
    }

    async fn list_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<OrganizationArchive>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM organization_archives
            WHERE expires_at < ? AND status IN ('active', 'expired')
            ORDER BY expires_at ASC
            LIMIT ?
            "#,
            ARCHIVE_COLUMNS
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_archive).collect()
    }

    async fn claim_notification(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        day_start: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organization_archives
            SET notified_at = ?
            WHERE id = ? AND status = 'active'
              AND (notified_at IS NULL OR notified_at < ?)
            "#,
        )
        .bind(now)
        .bind(id.to_string())
        .bind(day_start)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn claim_for_purge(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organization_archives
            SET status = 'expired'
            WHERE id = ? AND status = 'active'
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_deleted(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organization_archives
            SET status = 'deleted'
            WHERE id = ? AND status = 'expired'
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_document(&self, doc: NewArchivedDocument) -> DbResult<ArchivedDocument> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let payload_raw = serde_json::to_string(&doc.payload)?;

        sqlx::query(
            r#"
            INSERT INTO archived_documents (id, archive_id, source_module_id, payload, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(doc.archive_id.to_string())
        .bind(&doc.source_module_id)
        .bind(payload_raw)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(ArchivedDocument {
            id,
            archive_id: doc.archive_id,
            source_module_id: doc.source_module_id,
            payload: doc.payload,
            created_at: now,
        })
    }

    async fn list_documents(&self, archive_id: Uuid) -> DbResult<Vec<ArchivedDocument>> {
        let rows = sqlx::query(
            r#"
            SELECT id, archive_id, source_module_id, payload, created_at
            FROM archived_documents
            WHERE archive_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(archive_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_document).collect()
    }

    async fn delete_documents(&self, archive_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM archived_documents WHERE archive_id = ?")
            .bind(archive_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
