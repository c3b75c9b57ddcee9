use rust_decimal::Decimal;

use super::ledger_model::{
    CurrentBalanceBatch, InvestedCashRow, LedgerBatch, LedgerEntry, LedgerEntryKind,
    NewLedgerEntry, ResyncAction,
};
use crate::ledger::ledger_errors::Result;
use crate::models::BatchOutcome;

/// Contract for cash ledger persistence operations.
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Appends one immutable entry and resynchronizes the derived
    /// invested/withdrawn balances, all inside a single transaction.
    /// Returns the resolution that was applied.
    fn append_and_resync(&self, entry: NewLedgerEntry) -> Result<ResyncAction>;

    /// Sum of capital-movement entry amounts for the client.
    fn capital_balance(&self, client_id: &str) -> Result<Decimal>;
    /// The open-ended invested-cash row, if the client has one.
    fn current_invested_row(&self, client_id: &str) -> Result<Option<InvestedCashRow>>;
    fn withdrawn_amount(&self, client_id: &str) -> Result<Option<Decimal>>;
    fn entries_by_kinds(
        &self,
        client_id: &str,
        kinds: &[LedgerEntryKind],
    ) -> Result<Vec<LedgerEntry>>;
    /// Sum of `Charges` entry amounts, zero when none exist.
    fn charges_total(&self, client_id: &str) -> Result<Decimal>;

    fn upsert_current_balance(&self, client_id: &str, amount: Decimal) -> Result<()>;
    fn current_balance(&self, client_id: &str) -> Result<Option<Decimal>>;
}

/// Contract for cash ledger service operations.
#[async_trait::async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Processes the batch sequentially in input order; a failing row is
    /// skipped and reported while prior rows stay committed.
    async fn record_entries(&self, batch: LedgerBatch) -> Result<BatchOutcome>;
    async fn upsert_current_balances(&self, batch: CurrentBalanceBatch) -> Result<BatchOutcome>;
}
