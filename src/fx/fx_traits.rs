use async_trait::async_trait;

use crate::errors::Result;

use super::fx_model::{ExchangeRate, NewExchangeRate};

/// Trait defining the contract for the rate store.
pub trait FxRepositoryTrait: Send + Sync {
    fn get_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>>;
    fn get_rates(&self) -> Result<Vec<ExchangeRate>>;
    fn upsert_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate>;
}

/// Trait defining the contract for rate resolution.
#[async_trait]
pub trait FxServiceTrait: Send + Sync {
    fn get_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>>;
    fn get_rates(&self) -> Result<Vec<ExchangeRate>>;
    fn add_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate>;
    async fn resolve_rate(&self, from: &str, to: &str) -> Result<ExchangeRate>;
    async fn load_all_rates(&self) -> Result<usize>;
}
