use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::valuation_model::{CashSummary, TotalPnl, ValuationRefreshSummary};
use crate::pnl::DailyPnl;
use crate::valuation::valuation_errors::Result;

/// Read-side report surface, one operation per dashboard metric. Every
/// operation is scoped to a single client and returns `None` (or zero)
/// when the client simply has no data yet.
pub trait ValuationServiceTrait: Send + Sync {
    fn invested_cash(&self, client_id: &str) -> Result<Option<CashSummary>>;
    fn withdrawn_cash(&self, client_id: &str) -> Result<Option<Decimal>>;
    /// Invested cash plus all-time realised P&L, net of withdrawals.
    fn deployed_cash(&self, client_id: &str) -> Result<Option<CashSummary>>;
    fn invested_assets(&self, client_id: &str) -> Result<Decimal>;
    fn unrealised_pnl(&self, client_id: &str) -> Result<Option<Decimal>>;
    fn realised_pnl_series(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyPnl>>;
    /// Realised P&L inside the range plus all-time charges.
    fn realised_pnl_total(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Decimal>;
    fn total_pnl(&self, client_id: &str) -> Result<TotalPnl>;
    fn portfolio_value(&self, client_id: &str) -> Result<Decimal>;
    fn today_algo_pnl(&self, client_id: &str) -> Result<Option<Decimal>>;

    /// Recomputes `unrealised_pnl` and `market_value` on every open lot
    /// from the instruments' current market prices. Each lot updates in
    /// its own transaction; a missing quote aborts the run.
    fn refresh_valuations(&self) -> Result<ValuationRefreshSummary>;
}
