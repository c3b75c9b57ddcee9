use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::clients::ClientError;
use crate::holdings::HoldingsError;
use crate::instruments::InstrumentError;
use crate::ledger::LedgerError;
use crate::pnl::PnlError;
use crate::valuation::ValuationError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the reporting core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Instrument error: {0}")]
    Instrument(#[from] InstrumentError),

    #[error("Holdings error: {0}")]
    Holdings(#[from] HoldingsError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Realised PnL error: {0}")]
    Pnl(#[from] PnlError),

    #[error("Valuation error: {0}")]
    Valuation(#[from] ValuationError),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        Error::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Database(DatabaseError::PoolCreationFailed(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Database(DatabaseError::MigrationFailed(err.to_string()))
    }
}
