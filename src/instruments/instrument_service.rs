use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

use crate::instruments::instrument_errors::{InstrumentError, Result};
use crate::instruments::instrument_model::{InstrumentBatch, MarketFeed};
use crate::instruments::{InstrumentRepositoryTrait, InstrumentServiceTrait, QuoteProvider};

/// Service for the instrument (scrip) registry
pub struct InstrumentService {
    instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
    quote_provider: Arc<dyn QuoteProvider>,
}

impl InstrumentService {
    pub fn new(
        instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
        quote_provider: Arc<dyn QuoteProvider>,
    ) -> Self {
        Self {
            instrument_repository,
            quote_provider,
        }
    }
}

#[async_trait::async_trait]
impl InstrumentServiceTrait for InstrumentService {
    fn import_instruments(&self, batch: InstrumentBatch) -> Result<usize> {
        batch.validate()?;
        let inserted = self.instrument_repository.create_instruments(batch.entries)?;
        debug!("Imported {} instrument records", inserted);
        Ok(inserted)
    }

    fn resolve_codes(
        &self,
        pairs: &[(String, MarketFeed)],
    ) -> Result<HashMap<(String, MarketFeed), String>> {
        let resolved = self.instrument_repository.resolve_codes(pairs)?;

        let missing: Vec<String> = pairs
            .iter()
            .filter(|pair| !resolved.contains_key(*pair))
            .map(|(code, feed)| format!("(code: {}, feed: {})", code, feed.as_str()))
            .collect();
        if !missing.is_empty() {
            return Err(InstrumentError::NotFound(format!(
                "The following scrip code-feed pairs were not found: {}",
                missing.join(", ")
            )));
        }

        Ok(resolved)
    }

    async fn refresh_quotes(&self) -> Result<usize> {
        let instruments = self.instrument_repository.list_instruments()?;
        let mut refreshed = 0;

        // Any provider failure aborts the run before further writes; a
        // half-refreshed quote table would skew every valuation silently.
        for instrument in &instruments {
            let price = self
                .quote_provider
                .latest_price(&instrument.code, instrument.feed)
                .await?;
            self.instrument_repository.update_cmp(&instrument.id, price)?;
            refreshed += 1;
        }

        info!("Refreshed quotes for {} instruments", refreshed);
        Ok(refreshed)
    }
}
