use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::clients::ClientError;
use crate::holdings::HoldingsError;
use crate::instruments::InstrumentError;
use crate::ledger::LedgerError;
use crate::pnl::PnlError;

pub type Result<T> = std::result::Result<T, ValuationError>;

/// Custom error type for valuation and report operations
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    #[error("Account open date is missing for client {0}")]
    MissingAccountOpenDate(String),
    #[error("Quote missing for instrument {0}")]
    MissingQuote(String),
    #[error("Holdings error: {0}")]
    Holdings(#[from] HoldingsError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Realised PnL error: {0}")]
    Pnl(#[from] PnlError),
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
    #[error("Instrument error: {0}")]
    Instrument(#[from] InstrumentError),
}
