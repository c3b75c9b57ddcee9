use log::{debug, warn};
use std::sync::Arc;

use crate::clients::ClientServiceTrait;
use crate::ledger::{LedgerBatch, LedgerEntryKind, LedgerServiceTrait};
use crate::models::{BatchOutcome, RowFailure};
use crate::pnl::pnl_errors::{PnlError, Result};
use crate::pnl::pnl_model::{
    NewRealisedPnlRow, PnlContributor, RealisedPnlBatch, TodayAlgoPnlBatch,
};
use crate::pnl::{PnlRepositoryTrait, PnlServiceTrait};

/// Service for the realised P&L allocator
pub struct PnlService {
    pnl_repository: Arc<dyn PnlRepositoryTrait>,
    client_service: Arc<dyn ClientServiceTrait>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
}

impl PnlService {
    pub fn new(
        pnl_repository: Arc<dyn PnlRepositoryTrait>,
        client_service: Arc<dyn ClientServiceTrait>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
    ) -> Self {
        Self {
            pnl_repository,
            client_service,
            ledger_service,
        }
    }

    async fn apply_row(&self, batch: &RealisedPnlBatch, index: usize) -> Result<()> {
        match batch.contributors[index] {
            PnlContributor::ManagedEntity => {
                let client = self
                    .client_service
                    .get_by_broker_id(&batch.broker_ids[index])?;
                self.pnl_repository.insert_rows(vec![NewRealisedPnlRow {
                    client_id: client.id,
                    amount: batch.amounts[index],
                    entry_type: batch.entry_types[index],
                    date: batch.dates[index],
                }])?;
            }
            PnlContributor::Customer => {
                // Customer-funded gains are capital contributions, not
                // managed P&L; they travel through the cash ledger.
                let outcome = self
                    .ledger_service
                    .record_entries(LedgerBatch::single(
                        batch.broker_ids[index].clone(),
                        batch.amounts[index],
                        LedgerEntryKind::CustomerContributedPnl,
                        batch.dates[index],
                    ))
                    .await?;
                if let Some(failure) = outcome.skipped.first() {
                    return Err(PnlError::InvalidData(failure.reason.clone()));
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PnlServiceTrait for PnlService {
    async fn record_pnl(&self, batch: RealisedPnlBatch) -> Result<BatchOutcome> {
        batch.validate()?;

        let mut outcome = BatchOutcome::default();
        for index in 0..batch.len() {
            match self.apply_row(&batch, index).await {
                Ok(()) => outcome.applied += 1,
                Err(err) => {
                    warn!("Skipping realised P&L row {}: {}", index, err);
                    outcome.skipped.push(RowFailure {
                        index,
                        reason: err.to_string(),
                    });
                }
            }
        }
        debug!(
            "Recorded realised P&L batch: {} applied, {} skipped",
            outcome.applied,
            outcome.skipped.len()
        );

        Ok(outcome)
    }

    async fn upsert_today_algo_pnl(&self, batch: TodayAlgoPnlBatch) -> Result<BatchOutcome> {
        batch.validate()?;

        let mut outcome = BatchOutcome::default();
        for index in 0..batch.broker_ids.len() {
            // Zero is a legitimate daily P&L; flat days still overwrite.
            let result = self
                .client_service
                .get_by_broker_id(&batch.broker_ids[index])
                .map_err(PnlError::from)
                .and_then(|client| {
                    self.pnl_repository
                        .upsert_today_algo_pnl(&client.id, batch.amounts[index])
                });
            match result {
                Ok(()) => outcome.applied += 1,
                Err(err) => {
                    warn!("Skipping today's algo P&L row {}: {}", index, err);
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
