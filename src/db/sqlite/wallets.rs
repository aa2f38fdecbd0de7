use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{error::DbResult, repos::WalletRepo},
    models::Wallet,
};

pub struct SqliteWalletRepo {
    pool: SqlitePool,
}

impl SqliteWalletRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_wallet(row: &SqliteRow) -> DbResult<Wallet> {
    Ok(Wallet {
        organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
        balance_cents: row.get("balance_cents"),
        currency: row.get("currency"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl WalletRepo for SqliteWalletRepo {
    async fn get(&self, organization_id: Uuid) -> DbResult<Option<Wallet>> {
        let result = sqlx::query(
            "SELECT organization_id, balance_cents, currency, updated_at FROM wallets WHERE organization_id = ?",
        )
        .bind(organization_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        result.as_ref().map(map_wallet).transpose()
    }

    async fn upsert_balance(
        &self,
        organization_id: Uuid,
        balance_cents: i64,
    ) -> DbResult<Wallet> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO wallets (organization_id, balance_cents, currency, updated_at)
            VALUES (?, ?, 'EUR', ?)
            ON CONFLICT(organization_id)
            DO UPDATE SET balance_cents = excluded.balance_cents, updated_at = excluded.updated_at
            "#,
        )
        .bind(organization_id.to_string())
        .bind(balance_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT organization_id, balance_cents, currency, updated_at FROM wallets WHERE organization_id = ?",
        )
        .bind(organization_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        map_wallet(&row)
    }
}
