use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::constants::COMMISSION_DESCRIPTION;
use crate::db::get_connection;
use crate::errors::{Error, Result};
use crate::fx::{FxService, FxServiceTrait};
use crate::schema::{transactions, wallets};
use crate::wallets::wallets_model::WalletDB;
use crate::wallets::WalletRepository;

use super::transfers_errors::TransferError;
use super::transfers_model::{Transaction, TransactionDB};

/// Moves money between wallets.
///
/// Each public operation is one unit of work over the wallet rows: balance
/// check, debit, credit and the transaction record commit together or not at
/// all. Rates are resolved (and persisted) *before* the unit opens, so no
/// network call ever runs while wallet rows are locked; balances are re-read
/// inside the transaction.
pub struct TransferService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    fx_service: FxService,
    system_wallet_id: String,
    commission_percent: Decimal,
}

impl TransferService {
    /// Creates a new TransferService instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        fx_service: FxService,
        config: &AppConfig,
    ) -> Self {
        Self {
            pool,
            fx_service,
            system_wallet_id: config.system_wallet_id.clone(),
            commission_percent: config.commission_percent,
        }
    }

    /// Executes a single transfer between two wallets, converting the amount
    /// when their currencies differ
    pub async fn transfer(
        &self,
        wallet_from_id: &str,
        wallet_to_id: &str,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Transaction> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount(amount).into());
        }

        let repo = WalletRepository::new(self.pool.clone());
        let wallet_from = repo.get_by_id(wallet_from_id)?;
        let wallet_to = repo.get_by_id(wallet_to_id)?;

        let rate = self
            .resolve_pair(&wallet_from.currency, &wallet_to.currency)
            .await?;

        let mut conn = get_connection(&self.pool)?;
        let conn = &mut *conn;
        // Writers take the database write lock up front and queue on busy_timeout
        let transaction = conn
            .immediate_transaction::<Transaction, TransferError, _>(|conn| {
                post_transfer(conn, wallet_from_id, wallet_to_id, amount, rate, description)
            })
            .map_err(Error::from)?;

        debug!(
            "Transferred {} {} from {} to {}",
            amount, wallet_from.currency, wallet_from_id, wallet_to_id
        );

        Ok(transaction)
    }

    /// Executes a transfer, charging a commission to the sender when the
    /// wallets belong to different owners.
    ///
    /// The commission posting and the primary transfer run inside one unit
    /// of work: either both apply or neither does. The commission is
    /// computed in the source wallet's currency and routed to the system
    /// wallet with a fixed description. Returns the primary transaction.
    pub async fn move_money(
        &self,
        wallet_from_id: &str,
        wallet_to_id: &str,
        amount: Decimal,
        description: Option<&str>,
        charge_commission: bool,
    ) -> Result<Transaction> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount(amount).into());
        }

        let repo = WalletRepository::new(self.pool.clone());
        let wallet_from = repo.get_by_id(wallet_from_id)?;
        let wallet_to = repo.get_by_id(wallet_to_id)?;

        let rate = self
            .resolve_pair(&wallet_from.currency, &wallet_to.currency)
            .await?;

        let commission_amount = amount * self.commission_percent / dec!(100);
        let commission = if charge_commission
            && wallet_from.user_id != wallet_to.user_id
            && commission_amount > Decimal::ZERO
        {
            let system_wallet = repo.get_by_id(&self.system_wallet_id)?;
            let commission_rate = self
                .resolve_pair(&wallet_from.currency, &system_wallet.currency)
                .await?;
            Some((system_wallet.id, commission_amount, commission_rate))
        } else {
            None
        };

        let mut conn = get_connection(&self.pool)?;
        let conn = &mut *conn;
        let transaction = conn
            .immediate_transaction::<Transaction, TransferError, _>(|conn| {
                if let Some((system_wallet_id, commission_amount, commission_rate)) = &commission {
                    post_transfer(
                        conn,
                        wallet_from_id,
                        system_wallet_id,
                        *commission_amount,
                        *commission_rate,
                        Some(COMMISSION_DESCRIPTION),
                    )?;
                }

                post_transfer(conn, wallet_from_id, wallet_to_id, amount, rate, description)
            })
            .map_err(Error::from)?;

        Ok(transaction)
    }

    /// Resolves the conversion rate for a pair, `None` when no conversion is
    /// needed. Misses fall through to the external source and are persisted.
    async fn resolve_pair(&self, from: &str, to: &str) -> Result<Option<Decimal>> {
        if from == to {
            return Ok(None);
        }
        Ok(Some(self.fx_service.resolve_rate(from, to).await?.rate))
    }
}

/// Posts one transfer on an open unit of work: re-reads both wallets,
/// checks funds, applies the debit and the (possibly converted) credit and
/// records the transaction.
///
/// `rate` must be `Some` whenever the wallet currencies differ; callers
/// resolve it before the unit opens.
pub(crate) fn post_transfer(
    conn: &mut SqliteConnection,
    wallet_from_id: &str,
    wallet_to_id: &str,
    amount: Decimal,
    rate: Option<Decimal>,
    description: Option<&str>,
) -> std::result::Result<Transaction, TransferError> {
    if amount <= Decimal::ZERO {
        return Err(TransferError::InvalidAmount(amount));
    }

    let wallet_from = load_wallet(conn, wallet_from_id)?;
    let wallet_to = load_wallet(conn, wallet_to_id)?;

    let balance_from = parse_balance(&wallet_from)?;
    let balance_to = parse_balance(&wallet_to)?;

    if balance_from < amount {
        return Err(TransferError::InsufficientFunds {
            deficit: amount - balance_from,
            currency: wallet_from.currency,
        });
    }

    let to_amount = if wallet_from.currency == wallet_to.currency {
        amount
    } else {
        let rate = rate.ok_or_else(|| TransferError::RateUnavailable {
            from: wallet_from.currency.clone(),
            to: wallet_to.currency.clone(),
        })?;
        amount * rate
    };

    let now = Utc::now().to_rfc3339();

    if wallet_from_id == wallet_to_id {
        // Self-transfer nets out; one update so the debit is not applied twice
        diesel::update(wallets::table.find(wallet_from_id))
            .set((
                wallets::balance.eq((balance_from - amount + to_amount).to_string()),
                wallets::updated_at.eq(&now),
            ))
            .execute(conn)?;
    } else {
        diesel::update(wallets::table.find(wallet_from_id))
            .set((
                wallets::balance.eq((balance_from - amount).to_string()),
                wallets::updated_at.eq(&now),
            ))
            .execute(conn)?;

        diesel::update(wallets::table.find(wallet_to_id))
            .set((
                wallets::balance.eq((balance_to + to_amount).to_string()),
                wallets::updated_at.eq(&now),
            ))
            .execute(conn)?;
    }

    let transaction_db = TransactionDB {
        id: uuid::Uuid::new_v4().to_string(),
        wallet_from_id: wallet_from_id.to_string(),
        wallet_to_id: wallet_to_id.to_string(),
        amount: amount.to_string(),
        description: description.map(|d| d.to_string()),
        created_at: now,
    };

    diesel::insert_into(transactions::table)
        .values(&transaction_db)
        .execute(conn)?;

    Ok(transaction_db.into())
}

fn load_wallet(
    conn: &mut SqliteConnection,
    wallet_id: &str,
) -> std::result::Result<WalletDB, TransferError> {
    wallets::table
        .find(wallet_id)
        .first::<WalletDB>(conn)
        .optional()?
        .ok_or_else(|| TransferError::WalletNotFound(wallet_id.to_string()))
}

fn parse_balance(wallet: &WalletDB) -> std::result::Result<Decimal, TransferError> {
    wallet.balance.parse::<Decimal>().map_err(|e| {
        TransferError::DatabaseError(format!(
            "Wallet {} holds an unreadable balance: {}",
            wallet.id, e
        ))
    })
}
