use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::error::DbResult, models::Wallet};

#[async_trait]
pub trait WalletRepo: Send + Sync {
    async fn get(&self, organization_id: Uuid) -> DbResult<Option<Wallet>>;

    /// Create or overwrite the wallet balance. The finance subsystem owns
    /// the ledger; this exists for provisioning and tests.
    async fn upsert_balance(&self, organization_id: Uuid, balance_cents: i64)
    -> DbResult<Wallet>;
}
