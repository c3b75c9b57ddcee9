use log::warn;
use std::fmt::Display;
use std::sync::Arc;

use crate::clients::ClientServiceTrait;
use crate::holdings::HoldingsServiceTrait;
use crate::imports::imports_model::{ImportBatch, ImportOutcome};
use crate::instruments::InstrumentServiceTrait;
use crate::ledger::LedgerServiceTrait;
use crate::models::BatchOutcome;
use crate::pnl::PnlServiceTrait;

/// Dispatches typed entry batches to their owning services and maps every
/// result onto the uniform `{success, message}` shape the import layer
/// expects.
pub struct ImportService {
    client_service: Arc<dyn ClientServiceTrait>,
    instrument_service: Arc<dyn InstrumentServiceTrait>,
    holdings_service: Arc<dyn HoldingsServiceTrait>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
    pnl_service: Arc<dyn PnlServiceTrait>,
}

/// Contract for the batch entry intake.
#[async_trait::async_trait]
pub trait ImportServiceTrait: Send + Sync {
    async fn process(&self, batch: ImportBatch) -> ImportOutcome;
}

impl ImportService {
    pub fn new(
        client_service: Arc<dyn ClientServiceTrait>,
        instrument_service: Arc<dyn InstrumentServiceTrait>,
        holdings_service: Arc<dyn HoldingsServiceTrait>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
        pnl_service: Arc<dyn PnlServiceTrait>,
    ) -> Self {
        Self {
            client_service,
            instrument_service,
            holdings_service,
            ledger_service,
            pnl_service,
        }
    }

    fn outcome_from_batch<E: Display>(
        result: Result<BatchOutcome, E>,
        success_message: &str,
    ) -> ImportOutcome {
        match result {
            Ok(outcome) if outcome.is_clean() => ImportOutcome::ok(success_message),
            Ok(outcome) => {
                let detail: Vec<String> = outcome
                    .skipped
                    .iter()
                    .map(|failure| format!("row {}: {}", failure.index, failure.reason))
                    .collect();
                ImportOutcome::failed(format!(
                    "{} rows applied, {} skipped ({})",
                    outcome.applied,
                    outcome.skipped.len(),
                    detail.join("; ")
                ))
            }
            Err(err) => {
                warn!("Import batch failed: {}", err);
                ImportOutcome::failed(err.to_string())
            }
        }
    }
}

#[async_trait::async_trait]
impl ImportServiceTrait for ImportService {
    async fn process(&self, batch: ImportBatch) -> ImportOutcome {
        match batch {
            ImportBatch::Instruments(batch) => match self.instrument_service.import_instruments(batch) {
                Ok(_) => ImportOutcome::ok("Scrip entries created successfully"),
                Err(err) => ImportOutcome::failed(err.to_string()),
            },
            ImportBatch::Clients(batch) => match self.client_service.import_clients(batch) {
                Ok(_) => ImportOutcome::ok("Client CRM entries created successfully"),
                Err(err) => ImportOutcome::failed(err.to_string()),
            },
            ImportBatch::HoldingsTransactions(batch) => Self::outcome_from_batch(
                self.holdings_service.record_transactions(batch).await,
                "Holdings transactions processed successfully",
            ),
            ImportBatch::RealisedPnl(batch) => Self::outcome_from_batch(
                self.pnl_service.record_pnl(batch).await,
                "Realised PnL data processed successfully",
            ),
            ImportBatch::Ledger(batch) => Self::outcome_from_batch(
                self.ledger_service.record_entries(batch).await,
                "Ledger data processed successfully",
            ),
            ImportBatch::CurrentLedgerBalance(batch) => Self::outcome_from_batch(
                self.ledger_service.upsert_current_balances(batch).await,
                "Current ledger balance processed successfully",
            ),
            ImportBatch::TodayAlgoPnl(batch) => Self::outcome_from_batch(
                self.pnl_service.upsert_today_algo_pnl(batch).await,
                "Today's algo PnL processed successfully",
            ),
        }
    }
}
