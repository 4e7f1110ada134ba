use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use shared::{Error, Result};

use super::{Fetcher, UPSTREAM_TIMEOUT};
use crate::keys;
use crate::models::Weather;

const WEATHER_API_URL: &str = "https://api.weatherapi.com/v1/current.json";

/// Fetches current weather from weatherapi.com.
pub struct WeatherFetcher {
    http: reqwest::Client,
    api_key: String,
}

impl WeatherFetcher {
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
    location: Location,
    current: Current,
}

#[derive(Deserialize)]
struct Location {
    name: String,
}

#[derive(Deserialize)]
struct Current {
    temp_c: f64,
    feelslike_c: f64,
    humidity: i64,
    condition: Condition,
    wind_kph: f64,
    pressure_mb: f64,
    cloud: i64,
    vis_km: f64,
}

#[derive(Deserialize)]
struct Condition {
    text: String,
}

#[derive(Deserialize, Default)]
struct ApiError {
    #[serde(default)]
    error: ApiErrorBody,
}

#[derive(Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl Fetcher for WeatherFetcher {
    type Value = Weather;

    fn cache_key(&self, params: &[&str]) -> String {
        keys::weather(params.first().copied().unwrap_or_default())
    }

    async fn fetch(&self, params: &[&str]) -> Result<Weather> {
        let city = params.first().copied().unwrap_or_default().trim();
        if city.is_empty() {
            return Err(Error::Validation("city is required".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(Error::UpstreamFetch("WEATHERAPI_KEY not set".to_string()));
        }

        let response = self
            .http
            .get(WEATHER_API_URL)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .map_err(|e| Error::UpstreamFetch(format!("weather request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ApiError>().await.unwrap_or_default();
            return Err(Error::UpstreamFetch(format!(
                "weather api returned {status}: {}",
                body.error.message
            )));
        }

        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamFetch(format!("invalid weather response: {e}")))?;

        Ok(Weather {
            city: api.location.name,
            temp: api.current.temp_c,
            feels_like: api.current.feelslike_c,
            humidity: api.current.humidity,
            condition: api.current.condition.text,
            wind_kph: api.current.wind_kph,
            pressure_mb: api.current.pressure_mb,
            cloud: api.current.cloud,
            visibility: api.current.vis_km,
            updated: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_city_is_rejected_before_any_request() {
        let fetcher = WeatherFetcher::new("key").unwrap();
        assert!(matches!(
            fetcher.fetch(&["  "]).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(fetcher.fetch(&[]).await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn missing_api_key_is_an_upstream_error() {
        let fetcher = WeatherFetcher::new("").unwrap();
        assert!(matches!(
            fetcher.fetch(&["Moscow"]).await,
            Err(Error::UpstreamFetch(_))
        ));
    }

    #[test]
    fn cache_key_matches_the_shared_rule() {
        let fetcher = WeatherFetcher::new("key").unwrap();
        assert_eq!(fetcher.cache_key(&[" Moscow "]), "weather:moscow");
    }
}
