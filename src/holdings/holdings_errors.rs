use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::clients::ClientError;
use crate::instruments::InstrumentError;
use crate::ledger::LedgerError;

pub type Result<T> = std::result::Result<T, HoldingsError>;

/// Custom error type for holdings lot operations
#[derive(Debug, Error)]
pub enum HoldingsError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("All input arrays must be of the same length")]
    ArityMismatch,
    #[error("Insufficient open quantity for sell: requested {requested}, available {available}")]
    InsufficientInventory {
        requested: Decimal,
        available: Decimal,
    },
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<DieselError> for HoldingsError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => HoldingsError::NotFound("Record not found".to_string()),
            _ => HoldingsError::DatabaseError(err.to_string()),
        }
    }
}

impl From<ClientError> for HoldingsError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(msg) => HoldingsError::NotFound(msg),
            ClientError::InvalidData(msg) => HoldingsError::InvalidData(msg),
            ClientError::DatabaseError(msg) => HoldingsError::DatabaseError(msg),
        }
    }
}

impl From<InstrumentError> for HoldingsError {
    fn from(err: InstrumentError) -> Self {
        match err {
            InstrumentError::NotFound(msg) => HoldingsError::NotFound(msg),
            InstrumentError::InvalidData(msg) => HoldingsError::InvalidData(msg),
            InstrumentError::DatabaseError(msg) => HoldingsError::DatabaseError(msg),
            InstrumentError::QuoteProvider(msg) => HoldingsError::InvalidData(msg),
        }
    }
}
