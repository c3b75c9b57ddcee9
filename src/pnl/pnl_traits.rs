use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::pnl_model::{DailyPnl, NewRealisedPnlRow, RealisedPnlBatch, TodayAlgoPnlBatch};
use crate::models::BatchOutcome;
use crate::pnl::pnl_errors::Result;

/// Contract for realised P&L persistence operations. Every stored row is
/// managed-entity contributed; customer contributions never reach this
/// table.
pub trait PnlRepositoryTrait: Send + Sync {
    fn insert_rows(&self, rows: Vec<NewRealisedPnlRow>) -> Result<usize>;
    /// All-time realised P&L total, zero when the client has no rows.
    fn total_realised(&self, client_id: &str) -> Result<Decimal>;
    fn range_total(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Decimal>;
    /// Per-day realised P&L inside the range, ascending by date.
    fn daily_series(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyPnl>>;
    /// (date, amount) pairs of every realised row, for cash-flow assembly.
    fn rows_for_cashflows(&self, client_id: &str) -> Result<Vec<(DateTime<Utc>, Decimal)>>;

    fn upsert_today_algo_pnl(&self, client_id: &str, amount: Decimal) -> Result<()>;
    fn today_algo_pnl(&self, client_id: &str) -> Result<Option<Decimal>>;
}

/// Contract for realised P&L service operations.
#[async_trait::async_trait]
pub trait PnlServiceTrait: Send + Sync {
    /// Records a batch of realised P&L rows. Managed-entity rows are
    /// persisted; customer rows are forwarded to the cash ledger instead.
    /// Rows are independent: a failing row is skipped and reported.
    async fn record_pnl(&self, batch: RealisedPnlBatch) -> Result<BatchOutcome>;
    async fn upsert_today_algo_pnl(&self, batch: TodayAlgoPnlBatch) -> Result<BatchOutcome>;
}
