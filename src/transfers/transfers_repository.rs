use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_types::Double;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::transactions;

use super::transfers_model::{
    SortDirection, Transaction, TransactionDB, TransactionQuery, TransactionSort,
};

/// Repository for reading the transaction audit trail. Rows are only ever
/// written by the transfer engine, inside its unit of work.
pub struct TransferRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl TransferRepository {
    /// Creates a new TransferRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Retrieves a transaction by its ID
    pub fn get_by_id(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let row = transactions::table
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .optional()?;

        Ok(row.map(Transaction::from))
    }

    /// Lists transactions touching the queried wallets within the time
    /// window, ordered by the requested sort key
    pub fn list(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let (start, end) = query.window();

        let mut q = transactions::table
            .filter(transactions::created_at.ge(start.to_rfc3339()))
            .filter(transactions::created_at.le(end.to_rfc3339()))
            .into_boxed();

        if !query.wallet_ids.is_empty() {
            q = q.filter(
                transactions::wallet_from_id
                    .eq_any(&query.wallet_ids)
                    .or(transactions::wallet_to_id.eq_any(&query.wallet_ids)),
            );
        }

        q = match (query.sort, query.direction) {
            (TransactionSort::Created, SortDirection::Asc) => {
                q.order(transactions::created_at.asc())
            }
            (TransactionSort::Created, SortDirection::Desc) => {
                q.order(transactions::created_at.desc())
            }
            // Amounts are stored as TEXT; cast so "9" sorts below "10"
            (TransactionSort::Amount, SortDirection::Asc) => {
                q.order(sql::<Double>("CAST(amount AS REAL)").asc())
            }
            (TransactionSort::Amount, SortDirection::Desc) => {
                q.order(sql::<Double>("CAST(amount AS REAL)").desc())
            }
            (TransactionSort::Description, SortDirection::Asc) => {
                q.order(transactions::description.asc())
            }
            (TransactionSort::Description, SortDirection::Desc) => {
                q.order(transactions::description.desc())
            }
        };

        let rows = q.load::<TransactionDB>(&mut conn)?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }
}
