use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currencies::validate_currency_code;

use super::wallets_errors::{Result, WalletError};

/// Domain model representing a wallet: one currency, one owner, one balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    pub currency: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Ownership check used by callers gating transfers on the requesting user
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Input model for creating a new wallet; balances always start at zero
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWallet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub currency: String,
}

impl NewWallet {
    /// Validates the new wallet data
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(WalletError::InvalidData(
                "Wallet owner cannot be empty".to_string(),
            ));
        }
        validate_currency_code(&self.currency)
            .map_err(|e| WalletError::InvalidData(e.to_string()))?;
        Ok(())
    }
}

/// Database model for wallets
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletDB {
    pub id: String,
    pub user_id: String,
    pub currency: String,
    pub balance: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<WalletDB> for Wallet {
    fn from(db: WalletDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            currency: db.currency,
            balance: crate::utils::parse_decimal(&db.balance),
            created_at: crate::utils::parse_datetime(&db.created_at),
            updated_at: crate::utils::parse_datetime(&db.updated_at),
        }
    }
}

impl From<NewWallet> for WalletDB {
    fn from(domain: NewWallet) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: domain.id.unwrap_or_default(),
            user_id: domain.user_id,
            currency: domain.currency,
            balance: Decimal::ZERO.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
