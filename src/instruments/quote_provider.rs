use async_trait::async_trait;
use rust_decimal::Decimal;

use super::instrument_model::MarketFeed;
use super::InstrumentError;

/// Source of current market prices, implemented outside the core (vendor
/// HTTP clients, fixture data in tests). A failure from this trait must
/// abort the whole refresh run; partially refreshed prices are worse than
/// stale ones.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn latest_price(&self, code: &str, feed: MarketFeed) -> Result<Decimal, InstrumentError>;
}
