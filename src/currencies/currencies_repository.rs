use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::currencies;

use super::currencies_model::{Currency, CurrencyDB, NewCurrency};

/// Repository for managing currency rows
pub struct CurrencyRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl CurrencyRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Returns the currency for `code`, creating it if missing
    pub fn get_or_create(&self, code: &str) -> Result<Currency> {
        crate::currencies::validate_currency_code(code)?;

        let mut conn = get_connection(&self.pool)?;
        Ok(Self::ensure(&mut conn, code)?.into())
    }

    /// Retrieves a currency by its code
    pub fn get_by_code(&self, code: &str) -> Result<Option<Currency>> {
        let mut conn = get_connection(&self.pool)?;

        let currency = currencies::table
            .find(code)
            .first::<CurrencyDB>(&mut conn)
            .optional()?;

        Ok(currency.map(Currency::from))
    }

    /// Lists all known currencies ordered by code
    pub fn list(&self) -> Result<Vec<Currency>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = currencies::table
            .order(currencies::code.asc())
            .load::<CurrencyDB>(&mut conn)?;

        Ok(rows.into_iter().map(Currency::from).collect())
    }

    /// Creates the currency row for `code` if it does not exist yet and
    /// returns it. Runs on the caller's connection so it composes with an
    /// enclosing transaction; the code must already be validated.
    pub(crate) fn ensure(conn: &mut SqliteConnection, code: &str) -> QueryResult<CurrencyDB> {
        let currency_db: CurrencyDB = NewCurrency {
            code: code.to_string(),
            min_unit: 1,
        }
        .into();

        diesel::insert_or_ignore_into(currencies::table)
            .values(&currency_db)
            .execute(conn)?;

        currencies::table.find(code).first::<CurrencyDB>(conn)
    }
}
