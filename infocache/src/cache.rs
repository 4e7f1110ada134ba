//! Read-through cache accessor.

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::bus::Publisher;
use crate::fetch::Fetcher;
use crate::store::KeyValueStore;

/// Cache-aside orchestration of fetcher, store and bus producer.
///
/// `get` never writes the store itself: on a miss the fetched value is
/// returned to the caller immediately and published onto the bus, and
/// the typed workers converge the store asynchronously. This keeps
/// client latency bounded by store lookup + upstream fetch only.
pub struct CacheAccessor<T> {
    store: Arc<dyn KeyValueStore>,
    publisher: Arc<dyn Publisher>,
    fetcher: Arc<dyn Fetcher<Value = T>>,
}

impl<T> CacheAccessor<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        publisher: Arc<dyn Publisher>,
        fetcher: Arc<dyn Fetcher<Value = T>>,
    ) -> Self {
        Self {
            store,
            publisher,
            fetcher,
        }
    }

    /// Get-or-fetch-and-publish. Upstream errors propagate to the
    /// caller; store errors and corrupt entries degrade to a miss;
    /// publish failures are logged and never surfaced.
    pub async fn get(&self, params: &[&str]) -> Result<T> {
        let key = self.fetcher.cache_key(params);

        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_slice::<T>(&raw) {
                Ok(value) => {
                    debug!(%key, "cache hit");
                    return Ok(value);
                }
                Err(e) => warn!(%key, error = %e, "corrupt cache entry, refetching"),
            },
            Ok(None) => debug!(%key, "cache miss"),
            Err(e) => warn!(%key, error = %e, "store lookup failed, treating as miss"),
        }

        let value = self.fetcher.fetch(params).await?;

        match serde_json::to_vec(&value) {
            Ok(bytes) => self.publisher.publish_async(key.into_bytes(), bytes),
            Err(e) => warn!(%key, error = %e, "value not serializable, skipping publish"),
        }

        Ok(value)
    }
}
