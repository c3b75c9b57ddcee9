use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::holdings_model::{FundSource, HoldingsTrxBatch, Lot, NewLot, OwnedBy, SellApplication};
use crate::holdings::holdings_errors::Result;
use crate::models::BatchOutcome;

/// Contract for holdings lot persistence operations.
pub trait HoldingsRepositoryTrait: Send + Sync {
    fn insert_lots(&self, lots: Vec<NewLot>) -> Result<usize>;

    /// Matches a sell against the client's open lots and writes the
    /// consumed state back, as one atomic read-match-write transaction.
    fn apply_sell(
        &self,
        client_id: &str,
        instrument_id: &str,
        quantity: Decimal,
        price: Decimal,
        sell_date: DateTime<Utc>,
    ) -> Result<SellApplication>;

    /// Open lots for one client/instrument pair, oldest buy first.
    fn open_lots(&self, client_id: &str, instrument_id: &str) -> Result<Vec<Lot>>;
    /// Every open lot in the system, for the valuation refresh.
    fn open_lots_all(&self) -> Result<Vec<Lot>>;
    fn update_lot_valuation(
        &self,
        lot_id: i64,
        unrealised_pnl: Decimal,
        market_value: Decimal,
    ) -> Result<()>;

    /// All lots (open or closed) of the given ownership/funding class.
    fn lots_by_ownership(
        &self,
        client_id: &str,
        owned_by: OwnedBy,
        fund_source: FundSource,
    ) -> Result<Vec<Lot>>;
    /// Sum of unrealised P&L over the client's open, managed-entity lots;
    /// `None` when the client has no such lots.
    fn sum_unrealised_pnl(&self, client_id: &str) -> Result<Option<Decimal>>;
}

/// Contract for holdings lot service operations.
#[async_trait::async_trait]
pub trait HoldingsServiceTrait: Send + Sync {
    /// Records a batch of buy/sell transactions. Reference resolution
    /// failures reject the whole batch before any mutation; individual
    /// sell rows that cannot be covered are skipped and reported.
    async fn record_transactions(&self, batch: HoldingsTrxBatch) -> Result<BatchOutcome>;
}
