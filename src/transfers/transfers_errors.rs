use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for transfer operations
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Not enough money, deficit is {deficit} {currency}")]
    InsufficientFunds { deficit: Decimal, currency: String },
    #[error("Transfer amount must be positive, got {0}")]
    InvalidAmount(Decimal),
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),
    #[error("Currency rate not present for {from} -> {to}")]
    RateUnavailable { from: String, to: String },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DieselError> for TransferError {
    fn from(err: DieselError) -> Self {
        TransferError::DatabaseError(err.to_string())
    }
}

/// Result type for transfer operations
pub type Result<T> = std::result::Result<T, TransferError>;
