//! Periodic re-warming of the cache for frequently requested keys.

use shared::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::Publisher;
use crate::requestlog::RequestLog;

/// Ticker-driven job republishing the most requested lookups as
/// command-shaped messages on the popular-requests topic, which the
/// multiplexer → typed-worker path turns into fresh cache entries.
pub struct PopularityPublisher {
    request_log: Arc<dyn RequestLog>,
    producer: Arc<dyn Publisher>,
    interval: Duration,
}

impl PopularityPublisher {
    pub fn new(
        request_log: Arc<dyn RequestLog>,
        producer: Arc<dyn Publisher>,
        interval: Duration,
    ) -> Self {
        Self {
            request_log,
            producer,
            interval,
        }
    }

    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval = ?self.interval, "popularity publisher started");
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // An interval's first tick fires immediately; consume it so
            // the first run happens one interval in.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            warn!(error = %e, "popularity tick failed");
                        }
                    }
                }
            }
            info!("popularity publisher stopped");
        })
    }

    /// One tick: query the top requests and publish each as a command.
    /// A failed query aborts the tick; a failed publish skips only that
    /// item.
    pub async fn run_once(&self) -> Result<()> {
        let top = self.request_log.top_requests().await?;
        if top.is_empty() {
            debug!("no popular requests in window");
            return Ok(());
        }

        info!(count = top.len(), "republishing popular requests");
        for request in top {
            let Some(key) = request.bus_key() else {
                warn!(kind = %request.kind, "request with unknown kind or missing args, skipping");
                continue;
            };
            let value = match serde_json::to_vec(&request) {
                Ok(value) => value,
                Err(e) => {
                    warn!(%key, error = %e, "serialize failed, skipping");
                    continue;
                }
            };
            match self.producer.publish(key.as_bytes(), &value).await {
                Ok(()) => debug!(%key, "published"),
                Err(e) => warn!(%key, error = %e, "publish failed, skipping item"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PopularRequest;
    use crate::testutil::RecordingPublisher;
    use async_trait::async_trait;
    use shared::Error;
    use std::collections::HashMap;

    struct FixedLog {
        top: std::result::Result<Vec<PopularRequest>, String>,
    }

    #[async_trait]
    impl RequestLog for FixedLog {
        async fn save(&self, _seed: crate::models::LoggedRequest) -> Result<()> {
            Ok(())
        }

        async fn top_requests(&self) -> Result<Vec<PopularRequest>> {
            match &self.top {
                Ok(top) => Ok(top.clone()),
                Err(message) => Err(Error::Database(message.clone())),
            }
        }
    }

    fn weather_request(city: &str) -> PopularRequest {
        PopularRequest {
            kind: "weather".to_string(),
            args: HashMap::from([("city".to_string(), city.to_string())]),
        }
    }

    fn exchange_request(base: &str, target: &str) -> PopularRequest {
        PopularRequest {
            kind: "exchange".to_string(),
            args: HashMap::from([
                ("base".to_string(), base.to_string()),
                ("target".to_string(), target.to_string()),
            ]),
        }
    }

    fn publisher(
        top: std::result::Result<Vec<PopularRequest>, String>,
        producer: Arc<RecordingPublisher>,
    ) -> PopularityPublisher {
        PopularityPublisher::new(
            Arc::new(FixedLog { top }),
            producer,
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn publishes_one_command_per_top_entry_with_derived_keys() {
        let producer = Arc::new(RecordingPublisher::default());
        let top = vec![weather_request("Moscow"), exchange_request("USD", "EUR")];

        publisher(Ok(top.clone()), producer.clone())
            .run_once()
            .await
            .unwrap();

        let published = producer.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].0, b"weather:moscow");
        assert_eq!(published[1].0, b"exchange:usd_eur");

        let decoded: PopularRequest = serde_json::from_slice(&published[0].1).unwrap();
        assert_eq!(decoded, top[0]);
    }

    #[tokio::test]
    async fn failed_item_is_skipped_and_the_rest_still_publish() {
        let producer = Arc::new(RecordingPublisher::default());
        producer.fail_key(b"weather:moscow");
        let top = vec![weather_request("Moscow"), exchange_request("USD", "EUR")];

        publisher(Ok(top), producer.clone()).run_once().await.unwrap();

        let published = producer.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, b"exchange:usd_eur");
    }

    #[tokio::test]
    async fn unknown_kind_is_skipped() {
        let producer = Arc::new(RecordingPublisher::default());
        let top = vec![
            PopularRequest {
                kind: "stocks".to_string(),
                args: HashMap::new(),
            },
            weather_request("Moscow"),
        ];

        publisher(Ok(top), producer.clone()).run_once().await.unwrap();
        assert_eq!(producer.published().len(), 1);
    }

    #[tokio::test]
    async fn failed_query_aborts_the_tick() {
        let producer = Arc::new(RecordingPublisher::default());
        let result = publisher(Err("db down".to_string()), producer.clone())
            .run_once()
            .await;

        assert!(matches!(result, Err(Error::Database(_))));
        assert!(producer.published().is_empty());
    }

    #[tokio::test]
    async fn empty_top_is_a_quiet_no_op() {
        let producer = Arc::new(RecordingPublisher::default());
        publisher(Ok(Vec::new()), producer.clone())
            .run_once()
            .await
            .unwrap();
        assert!(producer.published().is_empty());
    }
}
