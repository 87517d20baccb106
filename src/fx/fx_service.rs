use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::Result;

use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, NewExchangeRate, RateTable};
use super::fx_provider::RateProvider;
use super::fx_traits::{FxRepositoryTrait, FxServiceTrait};

/// Resolves currency rates against the store, falling back to the external
/// source on a miss.
#[derive(Clone)]
pub struct FxService {
    repository: Arc<dyn FxRepositoryTrait>,
    provider: Arc<dyn RateProvider>,
}

impl FxService {
    pub fn new(repository: Arc<dyn FxRepositoryTrait>, provider: Arc<dyn RateProvider>) -> Self {
        Self {
            repository,
            provider,
        }
    }

    /// Persists every rate of a fetched table under `base`, returning the
    /// number of rates stored.
    fn store_table(&self, base: &str, table: &RateTable) -> Result<usize> {
        for (code, rate) in &table.rates {
            self.repository.upsert_rate(NewExchangeRate {
                from_currency: base.to_string(),
                to_currency: code.clone(),
                rate: *rate,
            })?;
        }
        Ok(table.rates.len())
    }
}

#[async_trait]
impl FxServiceTrait for FxService {
    fn get_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
        self.repository.get_rate(from, to)
    }

    fn get_rates(&self) -> Result<Vec<ExchangeRate>> {
        self.repository.get_rates()
    }

    /// Manual seeding path for rates known out of band
    fn add_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
        self.repository.upsert_rate(new_rate)
    }

    /// Returns the stored rate for the ordered pair, fetching the full table
    /// for `from` from the external source on a miss. One fetch populates
    /// every pair based on `from`, so later lookups hit the store.
    async fn resolve_rate(&self, from: &str, to: &str) -> Result<ExchangeRate> {
        if from == to {
            // Identity conversion; never stored
            let now = Utc::now();
            return Ok(ExchangeRate {
                id: ExchangeRate::pair_id(from, to),
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate: Decimal::ONE,
                created_at: now,
                updated_at: now,
            });
        }

        if let Some(rate) = self.repository.get_rate(from, to)? {
            return Ok(rate);
        }

        let table = self.provider.fetch_rates(Some(from)).await?;
        self.store_table(from, &table)?;

        self.repository.get_rate(from, to)?.ok_or_else(|| {
            FxError::RateUnavailable(format!("Rate for {} -> {} is not present", from, to)).into()
        })
    }

    /// Warms the store: fetches the default base table, then walks every
    /// discovered currency and persists its full table pairwise. Returns the
    /// number of rates stored.
    async fn load_all_rates(&self) -> Result<usize> {
        info!("Start load currency rates");
        let t0 = Instant::now();
        let mut stored = 0;

        let base_table = self.provider.fetch_rates(None).await?;
        for (code, rate) in &base_table.rates {
            self.repository.upsert_rate(NewExchangeRate {
                from_currency: base_table.base.clone(),
                to_currency: code.clone(),
                rate: *rate,
            })?;
            stored += 1;

            let table = self.provider.fetch_rates(Some(code)).await?;
            stored += self.store_table(code, &table)?;
        }

        info!("Currency rates loaded in {:?}", t0.elapsed());
        Ok(stored)
    }
}
