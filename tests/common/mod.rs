use async_trait::async_trait;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use billfold_core::config::AppConfig;
use billfold_core::db::{self, DbPool};
use billfold_core::fx::{FxError, FxRepository, FxService, RateProvider, RateTable};
use billfold_core::onboarding::OnboardingService;
use billfold_core::schema::wallets;
use billfold_core::transfers::TransferService;
use billfold_core::users::{NewUser, User, UserRepository};
use billfold_core::wallets::{NewWallet, Wallet, WalletRepository};

pub struct TestDb {
    pub pool: Arc<DbPool>,
    _dir: TempDir,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let db_path = db::init(dir.path().to_str().unwrap()).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    TestDb { pool, _dir: dir }
}

/// Rate provider serving canned tables and counting external fetches.
#[derive(Default)]
pub struct StaticRateProvider {
    tables: HashMap<Option<String>, RateTable>,
    fetches: AtomicUsize,
}

impl StaticRateProvider {
    pub fn with_table(mut self, base: &str, rates: &[(&str, Decimal)]) -> Self {
        self.tables.insert(
            Some(base.to_string()),
            RateTable {
                base: base.to_string(),
                rates: rates
                    .iter()
                    .map(|(code, rate)| (code.to_string(), *rate))
                    .collect(),
            },
        );
        self
    }

    pub fn with_default_table(mut self, base: &str, rates: &[(&str, Decimal)]) -> Self {
        self.tables.insert(
            None,
            RateTable {
                base: base.to_string(),
                rates: rates
                    .iter()
                    .map(|(code, rate)| (code.to_string(), *rate))
                    .collect(),
            },
        );
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn fetch_rates(&self, base: Option<&str>) -> Result<RateTable, FxError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.tables
            .get(&base.map(|b| b.to_string()))
            .cloned()
            .ok_or_else(|| FxError::ExternalSource("rate source unreachable".to_string()))
    }
}

pub fn fx_service(pool: &Arc<DbPool>, provider: Arc<StaticRateProvider>) -> FxService {
    FxService::new(Arc::new(FxRepository::new(pool.clone())), provider)
}

pub fn config_with_system_wallet(system_wallet_id: &str) -> AppConfig {
    AppConfig {
        system_wallet_id: system_wallet_id.to_string(),
        ..AppConfig::default()
    }
}

pub fn transfer_service(
    pool: &Arc<DbPool>,
    provider: Arc<StaticRateProvider>,
    system_wallet_id: &str,
) -> TransferService {
    TransferService::new(
        pool.clone(),
        fx_service(pool, provider),
        &config_with_system_wallet(system_wallet_id),
    )
}

pub fn onboarding_service(
    pool: &Arc<DbPool>,
    provider: Arc<StaticRateProvider>,
    system_wallet_id: &str,
) -> OnboardingService {
    OnboardingService::new(
        pool.clone(),
        fx_service(pool, provider),
        &config_with_system_wallet(system_wallet_id),
    )
}

pub fn create_user(pool: &Arc<DbPool>, name: &str) -> User {
    UserRepository::new(pool.clone())
        .create(NewUser {
            id: None,
            name: name.to_string(),
        })
        .expect("Failed to create user")
}

pub fn create_wallet(pool: &Arc<DbPool>, user_id: &str, currency: &str) -> Wallet {
    WalletRepository::new(pool.clone())
        .create(NewWallet {
            id: None,
            user_id: user_id.to_string(),
            currency: currency.to_string(),
        })
        .expect("Failed to create wallet")
}

/// Seeds a wallet balance directly, bypassing the transfer engine.
pub fn set_balance(pool: &Arc<DbPool>, wallet_id: &str, balance: Decimal) {
    let mut conn = pool.get().expect("Failed to get connection");
    diesel::update(wallets::table.find(wallet_id))
        .set(wallets::balance.eq(balance.to_string()))
        .execute(&mut conn)
        .expect("Failed to seed balance");
}

pub fn get_balance(pool: &Arc<DbPool>, wallet_id: &str) -> Decimal {
    WalletRepository::new(pool.clone())
        .get_by_id(wallet_id)
        .expect("Failed to load wallet")
        .balance
}

/// Creates the system account and its funded wallet.
pub fn create_system_wallet(pool: &Arc<DbPool>, currency: &str, balance: Decimal) -> Wallet {
    let system_user = create_user(pool, "system");
    let wallet = create_wallet(pool, &system_user.id, currency);
    set_balance(pool, &wallet.id, balance);
    wallet
}
