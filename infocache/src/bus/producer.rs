use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use shared::{Error, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::Publisher;

/// Broker acknowledgment timeout for a single publish.
const ACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of the fire-and-forget publish queue. One queue per topic;
/// on overflow the message is dropped with a warning.
const PUBLISH_QUEUE_CAPACITY: usize = 256;

/// Producer for a single topic.
///
/// Must be created inside a tokio runtime: `connect` spawns the task
/// that drains the async publish queue.
pub struct BusProducer {
    topic: String,
    inner: FutureProducer,
    queue: mpsc::Sender<(Vec<u8>, Vec<u8>)>,
}

impl BusProducer {
    pub fn connect(brokers: &str, topic: &str) -> Result<Self> {
        let inner: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "10000")
            .create()
            .map_err(|e| Error::Bus(format!("producer init for {topic}: {e}")))?;

        let (queue, mut pending) = mpsc::channel::<(Vec<u8>, Vec<u8>)>(PUBLISH_QUEUE_CAPACITY);
        let drain = inner.clone();
        let drain_topic = topic.to_string();
        tokio::spawn(async move {
            while let Some((key, value)) = pending.recv().await {
                if let Err(e) = send(&drain, &drain_topic, &key, &value).await {
                    warn!(topic = %drain_topic, error = %e, "async publish failed");
                }
            }
        });

        info!(topic, "bus producer initialized");
        Ok(Self {
            topic: topic.to_string(),
            inner,
            queue,
        })
    }

    /// Flush outstanding records. Safe to call once during shutdown.
    pub fn close(&self) {
        if let Err(e) = self.inner.flush(ACK_TIMEOUT) {
            warn!(topic = %self.topic, error = %e, "producer flush failed");
        }
    }
}

async fn send(producer: &FutureProducer, topic: &str, key: &[u8], value: &[u8]) -> Result<()> {
    producer
        .send(FutureRecord::to(topic).key(key).payload(value), ACK_TIMEOUT)
        .await
        .map(|_| ())
        .map_err(|(e, _)| Error::BusPublish(format!("{topic}: {e}")))
}

#[async_trait]
impl Publisher for BusProducer {
    async fn publish(&self, key: &[u8], value: &[u8]) -> Result<()> {
        send(&self.inner, &self.topic, key, value).await
    }

    fn publish_async(&self, key: Vec<u8>, value: Vec<u8>) {
        if let Err(e) = self.queue.try_send((key, value)) {
            warn!(topic = %self.topic, error = %e, "publish queue full, dropping message");
        }
    }
}
