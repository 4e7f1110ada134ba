//! Key-value store port and the Redis adapter.

use async_trait::async_trait;
use redis::AsyncCommands;
use shared::{Error, Result};
use std::time::Duration;

/// Port for the shared, TTL-expiring key-value store. Entries disappear
/// via TTL expiry, never explicit deletion.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Redis-backed store. One client shared across accessor, workers and
/// middleware; each call runs on a multiplexed async connection.
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn connect(url: &str) -> Result<Self> {
        let client =
            redis::Client::open(url).map_err(|e| Error::Store(format!("invalid redis url: {e}")))?;
        Ok(Self { client })
    }

    /// Round-trip connectivity check, used once at startup.
    pub async fn ping(&self) -> Result<()> {
        let mut con = self.connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut con)
            .await
            .map_err(|e| Error::Store(format!("ping failed: {e}")))?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(Error::Store(format!("unexpected ping reply: {pong}")))
        }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::Store(format!("connection failed: {e}")))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut con = self.connection().await?;
        con.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| Error::Store(format!("GET {key}: {e}")))
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut con = self.connection().await?;
        con.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(|e| Error::Store(format!("SET {key}: {e}")))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut con = self.connection().await?;
        con.exists::<_, bool>(key)
            .await
            .map_err(|e| Error::Store(format!("EXISTS {key}: {e}")))
    }
}
