use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Domain model representing a currency.
///
/// Currencies are created lazily the first time a wallet or rate references
/// their code; `min_unit` is the count of the smallest transferable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub code: String,
    pub min_unit: i32,
    pub created_at: DateTime<Utc>,
}

/// Input model for creating a new currency
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCurrency {
    pub code: String,
    pub min_unit: i32,
}

/// Validates a 3-letter alphabetic currency code
pub fn validate_currency_code(code: &str) -> Result<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Invalid currency code: {}",
            code
        ))));
    }
    Ok(())
}

/// Database model for currencies
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::currencies)]
#[diesel(primary_key(code))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CurrencyDB {
    pub code: String,
    pub min_unit: i32,
    pub created_at: String,
}

impl From<CurrencyDB> for Currency {
    fn from(db: CurrencyDB) -> Self {
        Self {
            code: db.code,
            min_unit: db.min_unit,
            created_at: crate::utils::parse_datetime(&db.created_at),
        }
    }
}

impl From<NewCurrency> for CurrencyDB {
    fn from(domain: NewCurrency) -> Self {
        Self {
            code: domain.code,
            min_unit: domain.min_unit,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
