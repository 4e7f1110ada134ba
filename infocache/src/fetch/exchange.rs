use async_trait::async_trait;
use serde::Deserialize;
use shared::{Error, Result};
use std::collections::HashMap;

use super::{Fetcher, UPSTREAM_TIMEOUT};
use crate::keys;
use crate::models::ExchangeRate;

const EXCHANGE_API_URL: &str = "https://api.freecurrencyapi.com/v1/latest";

/// Fetches a currency pair rate from freecurrencyapi.com.
pub struct ExchangeFetcher {
    http: reqwest::Client,
    api_key: String,
}

impl ExchangeFetcher {
    pub fn new(api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| Error::UpstreamFetch(format!("http client init: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: HashMap<String, f64>,
    #[serde(default)]
    meta: ApiMeta,
}

#[derive(Deserialize, Default)]
struct ApiMeta {
    #[serde(default)]
    last_updated_at: String,
}

#[async_trait]
impl Fetcher for ExchangeFetcher {
    type Value = ExchangeRate;

    fn cache_key(&self, params: &[&str]) -> String {
        let base = params.first().copied().unwrap_or_default();
        let target = params.get(1).copied().unwrap_or_default();
        keys::exchange(base, target)
    }

    async fn fetch(&self, params: &[&str]) -> Result<ExchangeRate> {
        let base = params.first().copied().unwrap_or_default().trim();
        let target = params.get(1).copied().unwrap_or_default().trim();
        if base.is_empty() || target.is_empty() {
            return Err(Error::Validation("base and target are required".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(Error::UpstreamFetch(
                "FREECURRENCY_API_KEY not set".to_string(),
            ));
        }

        let response = self
            .http
            .get(EXCHANGE_API_URL)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("base_currency", base),
                ("currencies", target),
            ])
            .send()
            .await
            .map_err(|e| Error::UpstreamFetch(format!("exchange request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamFetch(format!(
                "exchange api returned {status}"
            )));
        }

        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamFetch(format!("invalid exchange response: {e}")))?;

        let rate = api
            .data
            .get(&target.to_uppercase())
            .copied()
            .ok_or_else(|| Error::UpstreamFetch(format!("currency {target} not found")))?;

        Ok(ExchangeRate {
            base: base.to_string(),
            target: target.to_string(),
            rate,
            updated: api.meta.last_updated_at,
        })
    }
}
