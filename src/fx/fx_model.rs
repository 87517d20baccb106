use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Domain model for a directional currency-pair rate.
///
/// Rates are directional: the rate for A -> B says nothing about B -> A.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    /// Builds the pair symbol used as the rate row id, e.g. "USDEUR"
    pub fn pair_id(from: &str, to: &str) -> String {
        format!("{}{}", from, to)
    }
}

/// Input model for creating or replacing a rate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
}

/// A full rate table fetched from the external source: every known rate
/// based on one currency.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, Decimal>,
}

/// Database model for currency rates
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::currency_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRateDB {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ExchangeRateDB> for ExchangeRate {
    fn from(db: ExchangeRateDB) -> Self {
        Self {
            id: db.id,
            from_currency: db.from_currency,
            to_currency: db.to_currency,
            rate: crate::utils::parse_decimal(&db.rate),
            created_at: crate::utils::parse_datetime(&db.created_at),
            updated_at: crate::utils::parse_datetime(&db.updated_at),
        }
    }
}

impl From<&NewExchangeRate> for ExchangeRateDB {
    fn from(domain: &NewExchangeRate) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: ExchangeRate::pair_id(&domain.from_currency, &domain.to_currency),
            from_currency: domain.from_currency.clone(),
            to_currency: domain.to_currency.clone(),
            rate: domain.rate.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
