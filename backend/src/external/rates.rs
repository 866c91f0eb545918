//! Exchange-rate provider client
//!
//! Fetches the day's currency rates as a `{currency_code: rate}` mapping.
//! The provider is fail-open: any failure (timeout, bad status, parse
//! error) degrades to a rate of 1.0 for every code, with a logged
//! warning, so a business transaction is never blocked by the rate feed.
//! Callers fetch once per operation and freeze the value into the record.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use shared::Currency;

use crate::config::RatesConfig;

/// Rate provider client
#[derive(Clone)]
pub struct RateClient {
    client: Client,
    endpoint: String,
    enabled: bool,
}

impl RateClient {
    pub fn new(config: &RatesConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: config.endpoint.clone(),
            enabled: config.enabled,
        }
    }

    /// Default mapping used when the provider is disabled or unreachable
    pub fn default_rates() -> HashMap<String, Decimal> {
        Currency::foreign()
            .iter()
            .map(|c| (c.as_str().to_string(), Decimal::ONE))
            .collect()
    }

    /// Snapshot of today's rates. Codes the provider omits fall back to
    /// 1.0 so lookups never miss.
    pub async fn fetch(&self) -> HashMap<String, Decimal> {
        if !self.enabled {
            return Self::default_rates();
        }

        match self.try_fetch().await {
            Ok(fetched) => {
                let mut rates = Self::default_rates();
                rates.extend(fetched);
                rates
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    endpoint = %self.endpoint,
                    "rate provider unavailable, falling back to 1.0"
                );
                Self::default_rates()
            }
        }
    }

    /// Rate for one currency, to be locked onto the originating record.
    /// The base currency is always 1.
    pub async fn rate_for(&self, currency: Currency) -> Decimal {
        if currency == Currency::Try {
            return Decimal::ONE;
        }

        let rates = self.fetch().await;
        match rates.get(currency.as_str()) {
            Some(rate) => *rate,
            None => {
                tracing::warn!(currency = currency.as_str(), "no rate quoted, using 1.0");
                Decimal::ONE
            }
        }
    }

    async fn try_fetch(&self) -> Result<HashMap<String, Decimal>, reqwest::Error> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?;

        response.json::<HashMap<String, Decimal>>().await
    }
}
