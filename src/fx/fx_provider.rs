use async_trait::async_trait;
use log::{debug, info, warn};
use num_traits::FromPrimitive;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::constants::{RATE_FETCH_ATTEMPTS, RATE_FETCH_BACKOFF_MS, RATE_FETCH_TIMEOUT_SECS};

use super::fx_errors::FxError;
use super::fx_model::RateTable;

/// Source of external exchange rates.
///
/// `base` selects which currency the returned table is quoted against; the
/// source's own default base is used when absent.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: Option<&str>) -> Result<RateTable, FxError>;
}

#[derive(Deserialize, Debug)]
struct RatesApiResponse {
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

/// Rate provider backed by an HTTP rates endpoint returning
/// `{"base": <code>, "rates": {<code>: <decimal>, ...}}`.
pub struct HttpRateProvider {
    base_url: String,
    client: Client,
}

impl HttpRateProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    fn url_for(&self, base: Option<&str>) -> String {
        match base {
            Some(code) => format!("{}?base={}", self.base_url, code),
            None => self.base_url.clone(),
        }
    }

    /// GETs `url`, retrying transient server errors with exponential backoff.
    async fn retry_get(&self, url: &str) -> Result<String, FxError> {
        let mut retries = 0;
        loop {
            debug!("GET {}", url);
            let resp = self
                .client
                .get(url)
                .timeout(Duration::from_secs(RATE_FETCH_TIMEOUT_SECS))
                .send()
                .await
                .map_err(|e| FxError::ExternalSource(e.to_string()))?;

            let status = resp.status();
            if is_transient(status) {
                retries += 1;
                if retries >= RATE_FETCH_ATTEMPTS {
                    return Err(FxError::ExternalSource(format!(
                        "HTTP {} after {} attempts",
                        status, retries
                    )));
                }
                let wait = RATE_FETCH_BACKOFF_MS * 2u64.pow(retries - 1);
                debug!("HTTP {} received; retrying in {}ms", status, wait);
                sleep(Duration::from_millis(wait)).await;
                continue;
            }

            let body = resp
                .text()
                .await
                .map_err(|e| FxError::ExternalSource(e.to_string()))?;
            if !status.is_success() {
                return Err(FxError::ExternalSource(format!("HTTP {}: {}", status, body)));
            }
            return Ok(body);
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Validates the untrusted payload: both `base` and `rates` must be present
/// and every rate must be a finite number.
fn parse_rate_table(body: &str) -> Result<RateTable, FxError> {
    let response: RatesApiResponse =
        serde_json::from_str(body).map_err(|e| FxError::InvalidResponse(e.to_string()))?;

    let base = response
        .base
        .ok_or_else(|| FxError::InvalidResponse("missing base currency".to_string()))?;
    let raw_rates = response
        .rates
        .ok_or_else(|| FxError::InvalidResponse("missing rate mapping".to_string()))?;

    let mut rates = HashMap::with_capacity(raw_rates.len());
    for (code, value) in raw_rates {
        let rate = Decimal::from_f64(value).ok_or_else(|| {
            FxError::InvalidResponse(format!("rate for {} is not a number: {}", code, value))
        })?;
        rates.insert(code, rate);
    }

    Ok(RateTable { base, rates })
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_rates(&self, base: Option<&str>) -> Result<RateTable, FxError> {
        let url = self.url_for(base);
        let t0 = Instant::now();
        let result = self.retry_get(&url).await;
        info!("{} retrieve took {:?}", url, t0.elapsed());

        let table = parse_rate_table(&result?)?;
        if let Some(code) = base {
            if table.base != code {
                warn!(
                    "Rate source answered with base {} instead of {}",
                    table.base, code
                );
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_a_well_formed_table() {
        let table =
            parse_rate_table(r#"{"base":"USD","rates":{"EUR":0.9,"CNY":7.25}}"#).unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rates["EUR"], dec!(0.9));
        assert_eq!(table.rates["CNY"], dec!(7.25));
    }

    #[test]
    fn rejects_missing_base() {
        let err = parse_rate_table(r#"{"rates":{"EUR":0.9}}"#).unwrap_err();
        assert!(matches!(err, FxError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_missing_rates() {
        let err = parse_rate_table(r#"{"base":"USD"}"#).unwrap_err();
        assert!(matches!(err, FxError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_non_numeric_rates() {
        let err = parse_rate_table(r#"{"base":"USD","rates":{"EUR":"soon"}}"#).unwrap_err();
        assert!(matches!(err, FxError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_bodies_that_are_not_json() {
        let err = parse_rate_table("<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, FxError::InvalidResponse(_)));
    }
}
