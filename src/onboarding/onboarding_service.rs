use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::error;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::constants::{STARTER_CURRENCIES, WELCOME_GRANT_CURRENCY, WELCOME_GRANT_DESCRIPTION};
use crate::db::get_connection;
use crate::errors::{Error, Result};
use crate::fx::{FxService, FxServiceTrait};
use crate::schema::wallets;
use crate::transfers::transfers_service::post_transfer;
use crate::transfers::TransferError;
use crate::wallets::wallets_model::{NewWallet, WalletDB};
use crate::wallets::{Wallet, WalletRepository};

/// Creates a new user's starter wallets and seeds the first one with a
/// welcome grant from the system wallet.
pub struct OnboardingService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    fx_service: FxService,
    system_wallet_id: String,
    welcome_grant: Decimal,
}

impl OnboardingService {
    /// Creates a new OnboardingService instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        fx_service: FxService,
        config: &AppConfig,
    ) -> Self {
        Self {
            pool,
            fx_service,
            system_wallet_id: config.system_wallet_id.clone(),
            welcome_grant: config.welcome_grant,
        }
    }

    /// Creates one zero-balance wallet per starter currency, all in one unit
    /// of work, and attempts the welcome grant into the USD wallet.
    ///
    /// The grant runs on a nested unit (savepoint): an underfunded system
    /// wallet is logged and swallowed so account creation never blocks on
    /// it; every other grant failure propagates and rolls the bootstrap
    /// back.
    pub async fn create_starter_wallets(&self, user_id: &str) -> Result<Vec<Wallet>> {
        let repo = WalletRepository::new(self.pool.clone());
        let system_wallet = repo.get_by_id(&self.system_wallet_id)?;

        // The grant may need a conversion; resolve it before any row is held
        let grant_rate = if system_wallet.currency != WELCOME_GRANT_CURRENCY {
            Some(
                self.fx_service
                    .resolve_rate(&system_wallet.currency, WELCOME_GRANT_CURRENCY)
                    .await?
                    .rate,
            )
        } else {
            None
        };

        let welcome_grant = self.welcome_grant;
        let system_wallet_id = self.system_wallet_id.clone();

        let mut conn = get_connection(&self.pool)?;
        let conn = &mut *conn;
        let wallets = conn.immediate_transaction::<Vec<Wallet>, Error, _>(|conn| {
            let mut created = Vec::with_capacity(STARTER_CURRENCIES.len());

            for code in STARTER_CURRENCIES {
                let wallet_db = WalletRepository::insert(
                    conn,
                    NewWallet {
                        id: None,
                        user_id: user_id.to_string(),
                        currency: code.to_string(),
                    },
                )?;

                if code == WELCOME_GRANT_CURRENCY {
                    let grant = conn.transaction::<_, TransferError, _>(|conn| {
                        post_transfer(
                            conn,
                            &system_wallet_id,
                            &wallet_db.id,
                            welcome_grant,
                            grant_rate,
                            Some(WELCOME_GRANT_DESCRIPTION),
                        )
                    });

                    match grant {
                        Ok(_) => {}
                        Err(TransferError::InsufficientFunds { .. }) => {
                            error!("Not enough money at the system wallet, welcome grant skipped");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }

                // Re-read so the returned wallet reflects the grant
                let wallet_db = wallets::table
                    .find(&wallet_db.id)
                    .first::<WalletDB>(conn)?;
                created.push(Wallet::from(wallet_db));
            }

            Ok(created)
        })?;

        Ok(wallets)
    }
}
