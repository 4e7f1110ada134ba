//! In-crate test doubles behind the port traits.

use async_trait::async_trait;
use shared::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::bus::Publisher;
use crate::fetch::Fetcher;
use crate::store::KeyValueStore;

/// In-memory key-value store recording values and the TTL they were
/// written with. `failing()` makes every operation return a store error.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
    fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail {
            return Err(Error::Store("store down".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(value, _)| value.clone()))
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        if self.fail {
            return Err(Error::Store("store down".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, ttl));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        if self.fail {
            return Err(Error::Store("store down".to_string()));
        }
        Ok(self.entries.lock().unwrap().contains_key(key))
    }
}

/// Publisher that records everything handed to it; individual keys can
/// be made to fail the synchronous path.
#[derive(Default)]
pub struct RecordingPublisher {
    records: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
    fail_keys: Mutex<HashSet<Vec<u8>>>,
}

impl RecordingPublisher {
    pub fn fail_key(&self, key: &[u8]) {
        self.fail_keys.lock().unwrap().insert(key.to_vec());
    }

    pub fn published(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.fail_keys.lock().unwrap().contains(key) {
            return Err(Error::BusPublish("broker unavailable".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .push((key.to_vec(), value.to_vec()));
        Ok(())
    }

    fn publish_async(&self, key: Vec<u8>, value: Vec<u8>) {
        self.records.lock().unwrap().push((key, value));
    }
}

/// Fetcher stub over `String` values with a call counter. Keys follow
/// the same trim-and-lowercase rule the domain fetchers use.
pub struct StubFetcher {
    value: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn returning(value: &str) -> Self {
        Self {
            value: Ok(value.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn erroring(message: &str) -> Self {
        Self {
            value: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    type Value = String;

    fn cache_key(&self, params: &[&str]) -> String {
        format!(
            "stub:{}",
            params.join("_").trim().to_lowercase()
        )
    }

    async fn fetch(&self, _params: &[&str]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.value {
            Ok(value) => Ok(value.clone()),
            Err(message) => Err(Error::UpstreamFetch(message.clone())),
        }
    }
}
