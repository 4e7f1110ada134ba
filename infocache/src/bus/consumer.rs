use futures::FutureExt;
use rdkafka::Message;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use shared::{Error, Result};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Continuous consumer for one topic within a consumer group.
pub struct BusConsumer {
    inner: StreamConsumer,
    topic: String,
}

impl BusConsumer {
    pub fn connect(brokers: &str, topic: &str, group: &str) -> Result<Self> {
        let inner: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .create()
            .map_err(|e| Error::Bus(format!("consumer init for {topic}: {e}")))?;
        inner
            .subscribe(&[topic])
            .map_err(|e| Error::Bus(format!("subscribe {topic}: {e}")))?;

        info!(topic, group, "bus consumer initialized");
        Ok(Self {
            inner,
            topic: topic.to_string(),
        })
    }

    /// Spawn the poll loop. Records are handed to `handler` in arrival
    /// order within a partition, one at a time. A panicking handler is
    /// caught and logged so the loop keeps making progress; receive
    /// errors are retried with capped exponential backoff. The loop
    /// exits on cancellation and releases the underlying connection.
    pub fn start<F, Fut>(self, cancel: CancellationToken, handler: F) -> JoinHandle<()>
    where
        F: Fn(Vec<u8>, Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut backoff = INITIAL_BACKOFF;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = self.inner.recv() => match received {
                        Ok(record) => {
                            backoff = INITIAL_BACKOFF;
                            let key = record.key().unwrap_or_default().to_vec();
                            let value = record.payload().unwrap_or_default().to_vec();
                            if AssertUnwindSafe(handler(key, value))
                                .catch_unwind()
                                .await
                                .is_err()
                            {
                                error!(topic = %self.topic, "handler panicked, continuing");
                            }
                        }
                        Err(e) => {
                            warn!(topic = %self.topic, error = %e, "fetch failed, retrying");
                            tokio::time::sleep(backoff).await;
                            backoff = (backoff * 2).min(MAX_BACKOFF);
                        }
                    }
                }
            }
            info!(topic = %self.topic, "bus consumer stopped");
        })
    }
}
