use rust_decimal::Decimal;
use std::collections::HashMap;

use super::instrument_model::{Instrument, InstrumentBatch, MarketFeed, NewInstrumentRecord};
use crate::instruments::instrument_errors::Result;

/// Contract for instrument registry persistence operations.
pub trait InstrumentRepositoryTrait: Send + Sync {
    /// Inserts scrip records, silently skipping (code, feed) pairs already present.
    fn create_instruments(&self, instruments: Vec<NewInstrumentRecord>) -> Result<usize>;
    fn list_instruments(&self) -> Result<Vec<Instrument>>;
    /// Maps (code, feed) pairs to instrument ids; unknown pairs are absent from the map.
    fn resolve_codes(
        &self,
        pairs: &[(String, MarketFeed)],
    ) -> Result<HashMap<(String, MarketFeed), String>>;
    /// Current market prices for the given instrument ids.
    fn quotes_by_ids(&self, instrument_ids: &[String]) -> Result<HashMap<String, Decimal>>;
    fn update_cmp(&self, instrument_id: &str, cmp: Decimal) -> Result<()>;
}

/// Contract for instrument registry service operations.
#[async_trait::async_trait]
pub trait InstrumentServiceTrait: Send + Sync {
    fn import_instruments(&self, batch: InstrumentBatch) -> Result<usize>;
    /// Resolves every (code, feed) pair or fails with `NotFound` naming the missing ones.
    fn resolve_codes(
        &self,
        pairs: &[(String, MarketFeed)],
    ) -> Result<HashMap<(String, MarketFeed), String>>;
    /// Re-fetches the current market price of every instrument from the
    /// quote provider. Aborts on the first provider failure.
    async fn refresh_quotes(&self) -> Result<usize>;
}
