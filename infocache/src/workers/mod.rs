//! Background cache writers: the multiplexer, the typed workers and the
//! user syncer.

mod exchange;
mod handler;
pub mod multiplexer;
mod typed;
pub mod user_sync;
mod weather;

pub use exchange::{EXCHANGE_TTL, ExchangeWorkerHandler};
pub use handler::WorkerHandler;
pub use multiplexer::Multiplexer;
pub use typed::TypedWorker;
pub use weather::{WEATHER_TTL, WeatherWorkerHandler};

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bus::BusConsumers;
use crate::fetch::Fetcher;
use crate::models::{ExchangeRate, Weather};
use crate::store::KeyValueStore;

/// Capacity of each typed worker channel; overflow drops messages.
pub const CHANNEL_CAPACITY: usize = 100;

/// Handles of every spawned background loop, joined during shutdown.
pub struct WorkerPipeline {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPipeline {
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

/// Wire the consumers into channels and spawn every worker loop:
/// per-domain snapshot topics pass through into the typed channels, the
/// shared popular-requests topic is fanned out by discriminator, and
/// user events sync straight into the store.
pub fn start_workers(
    store: Arc<dyn KeyValueStore>,
    weather_fetcher: Arc<dyn Fetcher<Value = Weather>>,
    exchange_fetcher: Arc<dyn Fetcher<Value = ExchangeRate>>,
    consumers: BusConsumers,
    cancel: &CancellationToken,
) -> WorkerPipeline {
    let (weather_tx, weather_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (exchange_tx, exchange_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let handles = vec![
        multiplexer::attach_passthrough(consumers.weather, weather_tx.clone(), cancel.clone()),
        multiplexer::attach_passthrough(consumers.exchange, exchange_tx.clone(), cancel.clone()),
        Multiplexer::new()
            .register("weather", weather_tx)
            .register("exchange", exchange_tx)
            .attach(consumers.popular, cancel.clone()),
        user_sync::start(consumers.user, store.clone(), cancel.clone()),
        TypedWorker::new(
            weather_rx,
            store.clone(),
            WeatherWorkerHandler::new(weather_fetcher),
        )
        .start(cancel.clone()),
        TypedWorker::new(
            exchange_rx,
            store,
            ExchangeWorkerHandler::new(exchange_fetcher),
        )
        .start(cancel.clone()),
    ];

    WorkerPipeline { handles }
}
