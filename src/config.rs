use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::constants::DEFAULT_RATE_API_URL;

/// Runtime configuration for the ledger services.
///
/// `system_wallet_id` identifies the wallet that collects commissions and
/// funds welcome grants; it must reference an existing wallet before any
/// commissioned transfer or bootstrap runs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub system_wallet_id: String,
    pub commission_percent: Decimal,
    pub welcome_grant: Decimal,
    pub rate_api_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            system_wallet_id: String::new(),
            commission_percent: dec!(1),
            welcome_grant: dec!(100),
            rate_api_url: DEFAULT_RATE_API_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Builds the configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            system_wallet_id: std::env::var("BILLFOLD_SYSTEM_WALLET_ID").unwrap_or_default(),
            commission_percent: read_decimal("BILLFOLD_COMMISSION_PERCENT")
                .unwrap_or(defaults.commission_percent),
            welcome_grant: read_decimal("BILLFOLD_WELCOME_GRANT").unwrap_or(defaults.welcome_grant),
            rate_api_url: std::env::var("BILLFOLD_RATE_API_URL")
                .unwrap_or(defaults.rate_api_url),
        }
    }
}

fn read_decimal(key: &str) -> Option<Decimal> {
    let raw = std::env::var(key).ok()?;
    match Decimal::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_keeps_defaults_for_unset_or_unparsable_values() {
        std::env::set_var("BILLFOLD_COMMISSION_PERCENT", "2.5");
        std::env::set_var("BILLFOLD_WELCOME_GRANT", "not-a-number");

        let config = AppConfig::from_env();
        assert_eq!(config.commission_percent, dec!(2.5));
        assert_eq!(config.welcome_grant, dec!(100));
        assert_eq!(config.rate_api_url, DEFAULT_RATE_API_URL);

        std::env::remove_var("BILLFOLD_COMMISSION_PERCENT");
        std::env::remove_var("BILLFOLD_WELCOME_GRANT");
    }
}
