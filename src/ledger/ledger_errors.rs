use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::clients::ClientError;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Custom error type for cash ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("All input arrays must be of the same length")]
    ArityMismatch,
}

impl From<DieselError> for LedgerError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => LedgerError::NotFound("Record not found".to_string()),
            _ => LedgerError::DatabaseError(err.to_string()),
        }
    }
}

impl From<ClientError> for LedgerError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(msg) => LedgerError::NotFound(msg),
            ClientError::InvalidData(msg) => LedgerError::InvalidData(msg),
            ClientError::DatabaseError(msg) => LedgerError::DatabaseError(msg),
        }
    }
}
