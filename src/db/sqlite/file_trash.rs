use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::FileTrashRepo,
    },
    models::FileTrashEntry,
};

pub struct SqliteFileTrashRepo {
    pool: SqlitePool,
}

impl SqliteFileTrashRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_entry(row: &SqliteRow) -> DbResult<FileTrashEntry> {
    Ok(FileTrashEntry {
        file_id: parse_uuid(&row.get::<String, _>("file_id"))?,
        organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
        deleted_by: parse_uuid(&row.get::<String, _>("deleted_by"))?,
        deleted_at: row.get("deleted_at"),
        expires_at: row.get("expires_at"),
        retention_days: row.get("retention_days"),
        restored_at: row.get("restored_at"),
    })
}

const TRASH_COLUMNS: &str =
    "file_id, organization_id, deleted_by, deleted_at, expires_at, retention_days, restored_at";

#[async_trait]
impl FileTrashRepo for SqliteFileTrashRepo {
    async fn insert(&self, entry: FileTrashEntry) -> DbResult<FileTrashEntry> {
        sqlx::query(
            r#"
            INSERT INTO file_trash (file_id, organization_id, deleted_by, deleted_at, expires_at, retention_days)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.file_id.to_string())
        .bind(entry.organization_id.to_string())
        .bind(entry.deleted_by.to_string())
        .bind(entry.deleted_at)
        .bind(entry.expires_at)
        .bind(entry.retention_days)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("File {} is already in the trash", entry.file_id))
            }
            _ => DbError::from(e),
        })?;

        Ok(entry)
    }

    async fn get(&self, file_id: Uuid) -> DbResult<Option<FileTrashEntry>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM file_trash WHERE file_id = ?",
            TRASH_COLUMNS
        ))
        .bind(file_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        result.as_ref().map(map_entry).transpose()
    }

    async fn list_active_for_org(&self, organization_id: Uuid) -> DbResult<Vec<FileTrashEntry>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM file_trash
            WHERE organization_id = ? AND restored_at IS NULL
            ORDER BY deleted_at DESC
            "#,
            TRASH_COLUMNS
        ))
        .bind(organization_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_entry).collect()
    }

    async fn list_due(&self, now: DateTime<Utc>, limit: i64) -> DbResult<Vec<FileTrashEntry>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM file_trash
            WHERE restored_at IS NULL AND expires_at IS NOT NULL AND expires_at < ?
            ORDER BY expires_at ASC
            LIMIT ?
            "#,
            TRASH_COLUMNS
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_entry).collect()
    }

    async fn restore(&self, file_id: Uuid, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE file_trash
            SET restored_at = ?
            WHERE file_id = ? AND restored_at IS NULL
            "#,
        )
        .bind(now)
        .bind(file_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge(&self, file_id: Uuid) -> DbResult<bool> {
        let result =
            sqlx::query("DELETE FROM file_trash WHERE file_id = ? AND restored_at IS NULL")
                .bind(file_id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_org(&self, organization_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM file_trash WHERE organization_id = ?")
            .bind(organization_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
