use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::wallets_model::{NewWallet, Wallet};
use super::wallets_repository::WalletRepository;
use crate::wallets::Result;

/// Service for managing wallets
pub struct WalletService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl WalletService {
    /// Creates a new WalletService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new zero-balance wallet
    pub fn create_wallet(&self, new_wallet: NewWallet) -> Result<Wallet> {
        let repo = WalletRepository::new(self.pool.clone());
        repo.create(new_wallet)
    }

    /// Retrieves a wallet by its ID
    pub fn get_wallet(&self, wallet_id: &str) -> Result<Wallet> {
        let repo = WalletRepository::new(self.pool.clone());
        repo.get_by_id(wallet_id)
    }

    /// Lists all wallets owned by a user
    pub fn get_user_wallets(&self, user_id: &str) -> Result<Vec<Wallet>> {
        let repo = WalletRepository::new(self.pool.clone());
        repo.list_for_user(user_id)
    }

    /// Returns the current balance of a wallet
    pub fn get_balance(&self, wallet_id: &str) -> Result<Decimal> {
        Ok(self.get_wallet(wallet_id)?.balance)
    }
}
