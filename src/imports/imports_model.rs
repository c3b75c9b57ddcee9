use serde::{Deserialize, Serialize};

use crate::clients::ClientBatch;
use crate::holdings::HoldingsTrxBatch;
use crate::instruments::InstrumentBatch;
use crate::ledger::{CurrentBalanceBatch, LedgerBatch};
use crate::pnl::{RealisedPnlBatch, TodayAlgoPnlBatch};

/// One pre-validated, pre-typed batch per import kind. CSV parsing and
/// header validation happen upstream; by the time a batch reaches the core
/// it is already shaped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "batch")]
pub enum ImportBatch {
    Instruments(InstrumentBatch),
    Clients(ClientBatch),
    HoldingsTransactions(HoldingsTrxBatch),
    RealisedPnl(RealisedPnlBatch),
    Ledger(LedgerBatch),
    CurrentLedgerBalance(CurrentBalanceBatch),
    TodayAlgoPnl(TodayAlgoPnlBatch),
}

/// Uniform result handed back to the import layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
}

impl ImportOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
