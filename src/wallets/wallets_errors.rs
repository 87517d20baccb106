use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for wallet-related operations
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for WalletError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => WalletError::NotFound("Record not found".to_string()),
            _ => WalletError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for wallet operations
pub type Result<T> = std::result::Result<T, WalletError>;
