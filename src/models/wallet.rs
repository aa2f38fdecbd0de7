use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization's wallet. Balances are integer cents; the ledger behind
/// them lives in the finance subsystem and is out of scope here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub organization_id: Uuid,
    pub balance_cents: i64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn is_settled(&self) -> bool {
        self.balance_cents == 0
    }
}
