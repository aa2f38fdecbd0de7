use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{
        error::DbResult,
        repos::{FileRepo, FileUsage},
    },
    models::{CreateFile, StoredFile},
};

pub struct SqliteFileRepo {
    pool: SqlitePool,
}

impl SqliteFileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_file(row: &SqliteRow) -> DbResult<StoredFile> {
    Ok(StoredFile {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
        uploaded_by: parse_uuid(&row.get::<String, _>("uploaded_by"))?,
        filename: row.get("filename"),
        size_bytes: row.get("size_bytes"),
        storage_path: row.get("storage_path"),
        created_at: row.get("created_at"),
        deleted_at: row.get("deleted_at"),
    })
}

const FILE_COLUMNS: &str =
    "id, organization_id, uploaded_by, filename, size_bytes, storage_path, created_at, deleted_at";

#[async_trait]
impl FileRepo for SqliteFileRepo {
    async fn create(&self, input: CreateFile) -> DbResult<StoredFile> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO files (id, organization_id, uploaded_by, filename, size_bytes, storage_path, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(input.organization_id.to_string())
        .bind(input.uploaded_by.to_string())
        .bind(&input.filename)
        .bind(input.size_bytes)
        .bind(&input.storage_path)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(StoredFile {
            id,
            organization_id: input.organization_id,
            uploaded_by: input.uploaded_by,
            filename: input.filename,
            size_bytes: input.size_bytes,
            storage_path: input.storage_path,
            created_at: now,
            deleted_at: None,
        })
    }

    async fn get(&self, id: Uuid) -> DbResult<Option<StoredFile>> {
        let result = sqlx::query(&format!("SELECT {} FROM files WHERE id = ?", FILE_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        result.as_ref().map(map_file).transpose()
    }

    async fn list_for_org(
        &self,
        organization_id: Uuid,
        include_deleted: bool,
    ) -> DbResult<Vec<StoredFile>> {
        let deleted_filter = if include_deleted {
            ""
        } else {
            "AND deleted_at IS NULL"
        };

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM files
            WHERE organization_id = ? {}
            ORDER BY created_at DESC, id DESC
            "#,
            FILE_COLUMNS, deleted_filter
        ))
        .bind(organization_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_file).collect()
    }

    async fn usage_for_org(&self, organization_id: Uuid) -> DbResult<FileUsage> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS file_count, COALESCE(SUM(size_bytes), 0) AS total_bytes
            FROM files
            WHERE organization_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(FileUsage {
            file_count: row.get("file_count"),
            total_bytes: row.get("total_bytes"),
        })
    }

    async fn mark_deleted(&self, id: Uuid, now: DateTime<Utc>) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE files SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(now)
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_deleted(&self, id: Uuid) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE files SET deleted_at = NULL WHERE id = ? AND deleted_at IS NOT NULL")
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_org(&self, organization_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM files WHERE organization_id = ?")
            .bind(organization_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
