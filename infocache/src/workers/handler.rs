use async_trait::async_trait;
use serde::Serialize;
use shared::Result;
use std::time::Duration;

/// Port for resolving one raw bus payload into a value and its cache
/// key. Implemented once per domain type.
#[async_trait]
pub trait WorkerHandler: Send + Sync + 'static {
    type Value: Serialize + Send + Sync;

    /// Discriminator this handler accepts in command-shaped payloads.
    fn kind(&self) -> &'static str;

    /// Store TTL for values of this type.
    fn ttl(&self) -> Duration;

    /// Resolve a payload: a command of this kind triggers a fresh
    /// upstream fetch, a snapshot is used as-is. Anything else is a
    /// malformed-message error.
    async fn resolve(&self, payload: &[u8]) -> Result<(Self::Value, String)>;
}
