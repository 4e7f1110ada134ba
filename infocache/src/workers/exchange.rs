use async_trait::async_trait;
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

use super::WorkerHandler;
use crate::fetch::Fetcher;
use crate::keys;
use crate::models::{ExchangeRate, Payload};

pub const EXCHANGE_TTL: Duration = Duration::from_secs(3600);

/// Resolves exchange-rate payloads: commands re-fetch by currency pair,
/// snapshots are used directly.
pub struct ExchangeWorkerHandler {
    fetcher: Arc<dyn Fetcher<Value = ExchangeRate>>,
}

impl ExchangeWorkerHandler {
    pub fn new(fetcher: Arc<dyn Fetcher<Value = ExchangeRate>>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl WorkerHandler for ExchangeWorkerHandler {
    type Value = ExchangeRate;

    fn kind(&self) -> &'static str {
        "exchange"
    }

    fn ttl(&self) -> Duration {
        EXCHANGE_TTL
    }

    async fn resolve(&self, payload: &[u8]) -> Result<(ExchangeRate, String)> {
        match serde_json::from_slice::<Payload<ExchangeRate>>(payload) {
            Ok(Payload::Command(cmd)) => {
                if cmd.kind != self.kind() {
                    return Err(Error::MalformedMessage(format!(
                        "command kind '{}' on exchange channel",
                        cmd.kind
                    )));
                }
                let base = cmd.args.get("base").map(String::as_str).unwrap_or_default();
                let target = cmd
                    .args
                    .get("target")
                    .map(String::as_str)
                    .unwrap_or_default();
                if base.trim().is_empty() || target.trim().is_empty() {
                    return Err(Error::MalformedMessage(
                        "base and target are required in command".to_string(),
                    ));
                }
                let rate = self.fetcher.fetch(&[base, target]).await?;
                Ok((rate, keys::exchange(base, target)))
            }
            Ok(Payload::Snapshot(rate)) => {
                if rate.base.trim().is_empty() || rate.target.trim().is_empty() {
                    return Err(Error::MalformedMessage(
                        "base or target is empty in exchange snapshot".to_string(),
                    ));
                }
                let key = keys::exchange(&rate.base, &rate.target);
                Ok((rate, key))
            }
            Err(e) => Err(Error::MalformedMessage(format!(
                "invalid exchange payload: {e}"
            ))),
        }
    }
}
