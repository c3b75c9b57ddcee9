use diesel::result::Error as DieselError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Custom error type for client registry operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for ClientError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => ClientError::NotFound("Record not found".to_string()),
            _ => ClientError::DatabaseError(err.to_string()),
        }
    }
}
