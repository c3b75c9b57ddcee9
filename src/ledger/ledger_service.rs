use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::clients::ClientServiceTrait;
use crate::ledger::ledger_errors::Result;
use crate::ledger::ledger_model::{
    CurrentBalanceBatch, LedgerBatch, LedgerEntryKind, NewLedgerEntry,
};
use crate::ledger::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::models::{BatchOutcome, RowFailure};

/// Service for the cash ledger reconciler
pub struct LedgerService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    client_service: Arc<dyn ClientServiceTrait>,
}

impl LedgerService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        client_service: Arc<dyn ClientServiceTrait>,
    ) -> Self {
        Self {
            ledger_repository,
            client_service,
        }
    }

    fn apply_row(
        &self,
        broker_id: &str,
        amount: Decimal,
        entry_kind: LedgerEntryKind,
        date: DateTime<Utc>,
    ) -> Result<()> {
        let client = self.client_service.get_by_broker_id(broker_id)?;

        let action = self.ledger_repository.append_and_resync(NewLedgerEntry {
            client_id: client.id,
            amount,
            entry_kind,
            date,
        })?;
        debug!(
            "Ledger append for broker {} ({:?} {}): {:?}",
            broker_id, entry_kind, amount, action
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn record_entries(&self, batch: LedgerBatch) -> Result<BatchOutcome> {
        batch.validate()?;

        // Rows for the same client depend on the balance left by the
        // previous one, so the whole batch runs strictly in input order.
        let mut outcome = BatchOutcome::default();
        for index in 0..batch.len() {
            match self.apply_row(
                &batch.broker_ids[index],
                batch.amounts[index],
                batch.entry_kinds[index],
                batch.dates[index],
            ) {
                Ok(()) => outcome.applied += 1,
                Err(err) => {
                    warn!("Skipping ledger row {}: {}", index, err);
                    outcome.skipped.push(RowFailure {
                        index,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    async fn upsert_current_balances(&self, batch: CurrentBalanceBatch) -> Result<BatchOutcome> {
        batch.validate()?;

        let mut outcome = BatchOutcome::default();
        for index in 0..batch.broker_ids.len() {
            // A zero amount is a legitimate balance; only resolution or
            // storage failures skip the row.
            let result = self
                .client_service
                .get_by_broker_id(&batch.broker_ids[index])
                .map_err(Into::into)
                .and_then(|client| {
                    self.ledger_repository
                        .upsert_current_balance(&client.id, batch.amounts[index])
                });
            match result {
                Ok(()) => outcome.applied += 1,
                Err(err) => {
                    warn!("Skipping current ledger balance row {}: {}", index, err);
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
