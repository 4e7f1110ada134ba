//! Message bus producer/consumer wrappers and per-topic wiring.

mod consumer;
mod producer;

pub use consumer::BusConsumer;
pub use producer::BusProducer;

use async_trait::async_trait;
use shared::Result;
use shared::config::Config;
use std::sync::Arc;

/// Port for publishing onto the bus. `publish` waits for broker
/// acknowledgment; `publish_async` is fire-and-forget through a bounded
/// queue and never surfaces failures to the caller.
#[async_trait]
pub trait Publisher: Send + Sync + 'static {
    async fn publish(&self, key: &[u8], value: &[u8]) -> Result<()>;
    fn publish_async(&self, key: Vec<u8>, value: Vec<u8>);
}

/// One producer per topic. Shared across the accessors, the user
/// service and the popularity publisher.
pub struct BusProducers {
    pub weather: Arc<BusProducer>,
    pub exchange: Arc<BusProducer>,
    pub user: Arc<BusProducer>,
    pub popular: Arc<BusProducer>,
}

impl BusProducers {
    /// Flush all producers once during shutdown.
    pub fn close(&self) {
        self.weather.close();
        self.exchange.close();
        self.user.close();
        self.popular.close();
    }
}

/// One consumer per topic, handed to the worker pipeline.
pub struct BusConsumers {
    pub weather: BusConsumer,
    pub exchange: BusConsumer,
    pub user: BusConsumer,
    pub popular: BusConsumer,
}

/// The full bus wiring: per-domain topics plus the shared
/// popular-requests topic consumed by the multiplexer.
pub struct BusBundle {
    pub producers: BusProducers,
    pub consumers: BusConsumers,
}

impl BusBundle {
    pub fn connect(config: &Config) -> Result<Self> {
        let brokers = &config.kafka_brokers;
        Ok(Self {
            producers: BusProducers {
                weather: Arc::new(BusProducer::connect(brokers, &config.weather_topic)?),
                exchange: Arc::new(BusProducer::connect(brokers, &config.exchange_topic)?),
                user: Arc::new(BusProducer::connect(brokers, &config.user_topic)?),
                popular: Arc::new(BusProducer::connect(brokers, &config.popular_topic)?),
            },
            consumers: BusConsumers {
                weather: BusConsumer::connect(
                    brokers,
                    &config.weather_topic,
                    "weather-store-syncer",
                )?,
                exchange: BusConsumer::connect(
                    brokers,
                    &config.exchange_topic,
                    "exchange-store-syncer",
                )?,
                user: BusConsumer::connect(brokers, &config.user_topic, "user-store-syncer")?,
                popular: BusConsumer::connect(brokers, &config.popular_topic, "popular-syncer")?,
            },
        })
    }
}
