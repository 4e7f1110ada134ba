use async_trait::async_trait;
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

use super::WorkerHandler;
use crate::fetch::Fetcher;
use crate::keys;
use crate::models::{Payload, Weather};

pub const WEATHER_TTL: Duration = Duration::from_secs(600);

/// Resolves weather payloads: commands re-fetch by city, snapshots are
/// used directly.
pub struct WeatherWorkerHandler {
    fetcher: Arc<dyn Fetcher<Value = Weather>>,
}

impl WeatherWorkerHandler {
    pub fn new(fetcher: Arc<dyn Fetcher<Value = Weather>>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl WorkerHandler for WeatherWorkerHandler {
    type Value = Weather;

    fn kind(&self) -> &'static str {
        "weather"
    }

    fn ttl(&self) -> Duration {
        WEATHER_TTL
    }

    async fn resolve(&self, payload: &[u8]) -> Result<(Weather, String)> {
        match serde_json::from_slice::<Payload<Weather>>(payload) {
            Ok(Payload::Command(cmd)) => {
                if cmd.kind != self.kind() {
                    return Err(Error::MalformedMessage(format!(
                        "command kind '{}' on weather channel",
                        cmd.kind
                    )));
                }
                let city = cmd
                    .args
                    .get("city")
                    .map(String::as_str)
                    .unwrap_or_default()
                    .trim();
                if city.is_empty() {
                    return Err(Error::MalformedMessage(
                        "city is required in command".to_string(),
                    ));
                }
                let weather = self.fetcher.fetch(&[city]).await?;
                Ok((weather, keys::weather(city)))
            }
            Ok(Payload::Snapshot(weather)) => {
                if weather.city.trim().is_empty() {
                    return Err(Error::MalformedMessage(
                        "city is empty in weather snapshot".to_string(),
                    ));
                }
                let key = keys::weather(&weather.city);
                Ok((weather, key))
            }
            Err(e) => Err(Error::MalformedMessage(format!(
                "invalid weather payload: {e}"
            ))),
        }
    }
}
