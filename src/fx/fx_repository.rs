use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::info;
use std::sync::Arc;

use crate::currencies::{validate_currency_code, CurrencyRepository};
use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::currency_rates;

use super::fx_model::{ExchangeRate, ExchangeRateDB, NewExchangeRate};
use super::fx_traits::FxRepositoryTrait;

/// Repository for the currency rate store
pub struct FxRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl FxRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl FxRepositoryTrait for FxRepository {
    fn get_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        let row = currency_rates::table
            .find(ExchangeRate::pair_id(from, to))
            .first::<ExchangeRateDB>(&mut conn)
            .optional()?;

        Ok(row.map(ExchangeRate::from))
    }

    fn get_rates(&self) -> Result<Vec<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = currency_rates::table
            .order(currency_rates::id.asc())
            .load::<ExchangeRateDB>(&mut conn)?;

        Ok(rows.into_iter().map(ExchangeRate::from).collect())
    }

    /// Creates-or-replaces the directional rate, creating both currencies
    /// lazily. Idempotent: upserting the same pair twice leaves one row.
    fn upsert_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
        validate_currency_code(&new_rate.from_currency)?;
        validate_currency_code(&new_rate.to_currency)?;

        let mut conn = get_connection(&self.pool)?;
        let conn = &mut *conn;

        let row = conn.transaction::<ExchangeRateDB, diesel::result::Error, _>(|conn| {
            CurrencyRepository::ensure(conn, &new_rate.from_currency)?;
            CurrencyRepository::ensure(conn, &new_rate.to_currency)?;

            let rate_db = ExchangeRateDB::from(&new_rate);
            diesel::insert_into(currency_rates::table)
                .values(&rate_db)
                .on_conflict(currency_rates::id)
                .do_update()
                .set((
                    currency_rates::rate.eq(&rate_db.rate),
                    currency_rates::updated_at.eq(&rate_db.updated_at),
                ))
                .execute(conn)?;

            currency_rates::table
                .find(&rate_db.id)
                .first::<ExchangeRateDB>(conn)
        })?;

        info!(
            "Storing currency rate {} -> {} [{}]",
            row.from_currency, row.to_currency, row.rate
        );

        Ok(row.into())
    }
}
