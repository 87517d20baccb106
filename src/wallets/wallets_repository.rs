use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::currencies::CurrencyRepository;
use crate::db::{get_connection, DbTransactionExecutor};
use crate::schema::wallets;

use super::wallets_errors::{Result, WalletError};
use super::wallets_model::{NewWallet, Wallet, WalletDB};

/// Repository for managing wallet data in the database
pub struct WalletRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl WalletRepository {
    /// Creates a new WalletRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new zero-balance wallet, creating its currency lazily
    pub fn create(&self, new_wallet: NewWallet) -> Result<Wallet> {
        new_wallet.validate()?;

        let wallet_db = self
            .pool
            .execute(|conn| Self::insert(conn, new_wallet))
            .map_err(|e| WalletError::DatabaseError(e.to_string()))?;

        Ok(wallet_db.into())
    }

    /// Retrieves a wallet by its ID
    pub fn get_by_id(&self, wallet_id: &str) -> Result<Wallet> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| WalletError::DatabaseError(e.to_string()))?;

        let wallet = wallets::table
            .find(wallet_id)
            .first::<WalletDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    WalletError::NotFound(format!("Wallet with id {} not found", wallet_id))
                }
                _ => WalletError::DatabaseError(e.to_string()),
            })?;

        Ok(wallet.into())
    }

    /// Lists a user's wallets ordered by currency
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Wallet>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| WalletError::DatabaseError(e.to_string()))?;

        wallets::table
            .filter(wallets::user_id.eq(user_id))
            .order(wallets::currency.asc())
            .load::<WalletDB>(&mut conn)
            .map_err(|e| WalletError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Wallet::from).collect())
    }

    /// Inserts a validated wallet on the caller's connection so wallet
    /// creation composes with an enclosing transaction.
    pub(crate) fn insert(
        conn: &mut SqliteConnection,
        new_wallet: NewWallet,
    ) -> diesel::QueryResult<WalletDB> {
        CurrencyRepository::ensure(conn, &new_wallet.currency)?;

        let mut wallet_db: WalletDB = new_wallet.into();
        if wallet_db.id.is_empty() {
            wallet_db.id = uuid::Uuid::new_v4().to_string();
        }

        diesel::insert_into(wallets::table)
            .values(&wallet_db)
            .execute(conn)?;

        Ok(wallet_db)
    }
}
