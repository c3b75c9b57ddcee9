use log::{debug, warn};
use std::sync::Arc;

use crate::clients::ClientServiceTrait;
use crate::holdings::holdings_errors::Result;
use crate::holdings::holdings_model::{
    FundSource, HoldingsTrxBatch, NewLot, SellApplication, TradeSide,
};
use crate::holdings::{HoldingsRepositoryTrait, HoldingsServiceTrait};
use crate::instruments::{InstrumentServiceTrait, MarketFeed};
use crate::ledger::{LedgerBatch, LedgerEntryKind, LedgerServiceTrait};
use crate::models::{BatchOutcome, RowFailure};

/// Service for the holdings lot ledger
pub struct HoldingsService {
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    client_service: Arc<dyn ClientServiceTrait>,
    instrument_service: Arc<dyn InstrumentServiceTrait>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
}

impl HoldingsService {
    pub fn new(
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
        client_service: Arc<dyn ClientServiceTrait>,
        instrument_service: Arc<dyn InstrumentServiceTrait>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
    ) -> Self {
        Self {
            holdings_repository,
            client_service,
            instrument_service,
            ledger_service,
        }
    }
}

#[async_trait::async_trait]
impl HoldingsServiceTrait for HoldingsService {
    async fn record_transactions(&self, batch: HoldingsTrxBatch) -> Result<BatchOutcome> {
        batch.validate()?;

        // Every reference is resolved before any lot is written, so an
        // unknown broker or scrip rejects the batch as a whole.
        let client_ids = self.client_service.resolve_broker_ids(&batch.broker_ids)?;
        let pairs: Vec<(String, MarketFeed)> = batch
            .codes
            .iter()
            .cloned()
            .zip(batch.feeds.iter().copied())
            .collect();
        let instrument_ids = self.instrument_service.resolve_codes(&pairs)?;

        // Buys land first so a same-batch sell can match against them.
        let new_lots: Vec<NewLot> = (0..batch.len())
            .filter(|&index| batch.sides[index] == TradeSide::Buy)
            .map(|index| NewLot {
                client_id: client_ids[&batch.broker_ids[index]].clone(),
                instrument_id: instrument_ids[&pairs[index]].clone(),
                quantity: batch.quantities[index],
                price: batch.prices[index],
                buy_date: batch.dates[index],
                owned_by: batch.owned_by[index],
                fund_source: batch.fund_sources[index],
            })
            .collect();
        let created = self.holdings_repository.insert_lots(new_lots)?;
        debug!("Created {} lots from buy rows", created);

        let mut outcome = BatchOutcome {
            applied: created,
            skipped: Vec::new(),
        };

        for index in 0..batch.len() {
            if batch.sides[index] != TradeSide::Sell {
                continue;
            }

            let client_id = &client_ids[&batch.broker_ids[index]];
            let instrument_id = &instrument_ids[&pairs[index]];

            match self.holdings_repository.apply_sell(
                client_id,
                instrument_id,
                batch.quantities[index],
                batch.prices[index],
                batch.dates[index],
            ) {
                Ok(application) => {
                    outcome.applied += 1;
                    if let Err(err) = self
                        .forward_cost_basis_reduction(&batch, index, &application)
                        .await
                    {
                        warn!(
                            "Sell row {} applied but its ledger entry failed: {}",
                            index, err
                        );
                        outcome.skipped.push(RowFailure {
                            index,
                            reason: err.to_string(),
                        });
                    }
                }
                Err(err) => {
                    warn!("Skipping sell row {}: {}", index, err);
                    outcome.skipped.push(RowFailure {
                        index,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }
}

impl HoldingsService {
    /// A brokerage-flow sell funded from outside the account releases cost
    /// basis as cash; that reduction becomes an `InterDpStockSold` ledger
    /// entry dated at the sell.
    async fn forward_cost_basis_reduction(
        &self,
        batch: &HoldingsTrxBatch,
        index: usize,
        application: &SellApplication,
    ) -> Result<()> {
        if batch.feeds[index] != MarketFeed::Brokerage
            || batch.fund_sources[index] != FundSource::OutsideAccount
            || !application.buy_value_reduction.is_sign_positive()
            || application.buy_value_reduction.is_zero()
        {
            return Ok(());
        }

        let ledger_outcome = self
            .ledger_service
            .record_entries(LedgerBatch::single(
                batch.broker_ids[index].clone(),
                application.buy_value_reduction,
                LedgerEntryKind::InterDpStockSold,
                batch.dates[index],
            ))
            .await?;

        if let Some(failure) = ledger_outcome.skipped.first() {
            return Err(crate::ledger::LedgerError::InvalidData(failure.reason.clone()).into());
        }
        Ok(())
    }
}
