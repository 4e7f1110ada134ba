//! Upstream fetch strategies, one per domain type.

mod exchange;
mod weather;

pub use exchange::ExchangeFetcher;
pub use weather::WeatherFetcher;

use async_trait::async_trait;
use shared::Result;
use std::time::Duration;

pub(crate) const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Pure strategy: derive the cache key for a set of request parameters
/// and fetch a fresh value from the upstream provider.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    type Value: Send;

    fn cache_key(&self, params: &[&str]) -> String;
    async fn fetch(&self, params: &[&str]) -> Result<Self::Value>;
}
