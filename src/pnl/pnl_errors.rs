use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::clients::ClientError;
use crate::ledger::LedgerError;

pub type Result<T> = std::result::Result<T, PnlError>;

/// Custom error type for realised P&L operations
#[derive(Debug, Error)]
pub enum PnlError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("All input arrays must be of the same length")]
    ArityMismatch,
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<DieselError> for PnlError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => PnlError::NotFound("Record not found".to_string()),
            _ => PnlError::DatabaseError(err.to_string()),
        }
    }
}

impl From<ClientError> for PnlError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(msg) => PnlError::NotFound(msg),
            ClientError::InvalidData(msg) => PnlError::InvalidData(msg),
            ClientError::DatabaseError(msg) => PnlError::DatabaseError(msg),
        }
    }
}
