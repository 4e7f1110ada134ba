use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bus::BusConsumer;
use crate::keys;
use crate::store::KeyValueStore;

pub const USER_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Mirrors user events into the store: the message key is the user id,
/// the payload is stored verbatim under `user:<id>` for 24 hours.
pub fn start(
    consumer: BusConsumer,
    store: Arc<dyn KeyValueStore>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    consumer.start(cancel, move |key, value| {
        let store = store.clone();
        async move {
            let id = String::from_utf8_lossy(&key).to_string();
            if id.trim().is_empty() {
                warn!("user event with empty key, dropping");
                return;
            }
            let store_key = keys::user(&id);
            match store.put(&store_key, value, USER_TTL).await {
                Ok(()) => info!(key = %store_key, "user cached"),
                Err(e) => warn!(key = %store_key, error = %e, "store write failed"),
            }
        }
    })
}
