use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for exchange-rate operations
#[derive(Debug, Error)]
pub enum FxError {
    #[error("Currency rate not present: {0}")]
    RateUnavailable(String),
    #[error("Rate source request failed: {0}")]
    ExternalSource(String),
    #[error("Rate source returned an invalid payload: {0}")]
    InvalidResponse(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DieselError> for FxError {
    fn from(err: DieselError) -> Self {
        FxError::DatabaseError(err.to_string())
    }
}

/// Result type for exchange-rate operations
pub type Result<T> = std::result::Result<T, FxError>;
