use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable record of a completed transfer. The amount is always expressed
/// in the source wallet's currency at the time of the transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub wallet_from_id: String,
    pub wallet_to_id: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database model for transactions
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub wallet_from_id: String,
    pub wallet_to_id: String,
    pub amount: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            id: db.id,
            wallet_from_id: db.wallet_from_id,
            wallet_to_id: db.wallet_to_id,
            amount: crate::utils::parse_decimal(&db.amount),
            description: db.description,
            created_at: crate::utils::parse_datetime(&db.created_at),
        }
    }
}

/// Sort key for transaction history listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionSort {
    Created,
    Amount,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Filter for transaction history listings. An empty wallet set means no
/// wallet filtering; an unset time bound defaults to a trailing 30-day
/// window ending now.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub wallet_ids: Vec<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub sort: TransactionSort,
    pub direction: SortDirection,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            wallet_ids: Vec::new(),
            start: None,
            end: None,
            sort: TransactionSort::Created,
            direction: SortDirection::Asc,
        }
    }
}

impl TransactionQuery {
    /// Resolves the effective time window
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = self.end.unwrap_or_else(Utc::now);
        let start = self.start.unwrap_or_else(|| end - Duration::days(30));
        (start, end)
    }
}
