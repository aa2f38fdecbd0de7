use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    closure::checker::{CheckReport, CheckerError, ClosureChecker},
    db::DbPool,
    models::Blocker,
};

/// Finance subsystem checker.
///
/// Blocks closure while the wallet holds a non-zero balance. It archives and
/// purges nothing: ledger history is the platform's financial record and is
/// retained past organization deletion for audit and compliance, so the
/// commit and purge phases deliberately leave it untouched.
pub struct WalletChecker {
    db: Arc<DbPool>,
}

impl WalletChecker {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }
}

fn format_cents(cents: i64, currency: &str) -> String {
    let abs = cents.abs();
    format!(
        "{}{}.{:02} {}",
        if cents < 0 { "-" } else { "" },
        abs / 100,
        abs % 100,
        currency
    )
}

#[async_trait]
impl ClosureChecker for WalletChecker {
    fn module_id(&self) -> &'static str {
        "wallet"
    }

    async fn check(&self, organization_id: Uuid) -> Result<CheckReport, CheckerError> {
        let mut report = CheckReport::default();

        let Some(wallet) = self.db.wallets().get(organization_id).await? else {
            return Ok(report);
        };

        if !wallet.is_settled() {
            let amount = format_cents(wallet.balance_cents, &wallet.currency);
            let (title, action) = if wallet.balance_cents > 0 {
                (
                    "Outstanding wallet balance",
                    "Withdraw the remaining funds before closing",
                )
            } else {
                (
                    "Negative wallet balance",
                    "Settle the outstanding debt before closing",
                )
            };

            report = report.with_blocker(
                Blocker::blocking(
                    self.module_id(),
                    "outstanding_balance",
                    title,
                    format!("The wallet holds {}", amount),
                )
                .with_action(action),
            );
        }

        Ok(report)
    }

    async fn archive(
        &self,
        _organization_id: Uuid,
        _archive_id: Uuid,
    ) -> Result<Option<serde_json::Value>, CheckerError> {
        // Ledger rows outlive the organization; nothing to snapshot here.
        Ok(None)
    }

    async fn delete_archived(&self, _archive_id: Uuid) -> Result<(), CheckerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_formatting() {
        assert_eq!(format_cents(15000, "EUR"), "150.00 EUR");
        assert_eq!(format_cents(-305, "EUR"), "-3.05 EUR");
        assert_eq!(format_cents(7, "USD"), "0.07 USD");
    }
}
