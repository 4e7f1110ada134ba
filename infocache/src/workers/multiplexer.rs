//! Type-routing of bus messages into bounded worker channels.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::bus::BusConsumer;

#[derive(Deserialize)]
struct Probe {
    #[serde(rename = "type")]
    kind: String,
}

/// Routes messages from one shared topic into per-type channels by
/// their discriminator. Sends are non-blocking: a full channel drops
/// the message with a warning (liveness over completeness).
#[derive(Default)]
pub struct Multiplexer {
    channels: HashMap<&'static str, mpsc::Sender<Vec<u8>>>,
}

impl Multiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: &'static str, channel: mpsc::Sender<Vec<u8>>) -> Self {
        self.channels.insert(kind, channel);
        self
    }

    /// Route one raw payload. Missing or unrecognized discriminators
    /// are logged and dropped.
    pub fn route(&self, payload: Vec<u8>) {
        let kind = match serde_json::from_slice::<Probe>(&payload) {
            Ok(probe) => probe.kind,
            Err(e) => {
                warn!(error = %e, "message without recognized type, dropping");
                return;
            }
        };
        match self.channels.get(kind.as_str()) {
            Some(channel) => {
                if let Err(e) = channel.try_send(payload) {
                    warn!(kind = %kind, error = %e, "channel full, dropping message");
                }
            }
            None => warn!(kind = %kind, "unknown message type, dropping"),
        }
    }

    /// Attach this multiplexer to a consumer's poll loop.
    pub fn attach(self, consumer: BusConsumer, cancel: CancellationToken) -> JoinHandle<()> {
        let mux = Arc::new(self);
        consumer.start(cancel, move |_key, value| {
            let mux = mux.clone();
            async move { mux.route(value) }
        })
    }
}

/// Feed every message from a consumer straight into one channel,
/// without inspecting the payload. Used for the per-domain snapshot
/// topics, which carry exactly one type.
pub fn attach_passthrough(
    consumer: BusConsumer,
    channel: mpsc::Sender<Vec<u8>>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    consumer.start(cancel, move |key, value| {
        let channel = channel.clone();
        async move {
            if let Err(e) = channel.try_send(value) {
                warn!(
                    key = %String::from_utf8_lossy(&key),
                    error = %e,
                    "channel full, dropping message"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mux_with_channels(
        capacity: usize,
    ) -> (Multiplexer, mpsc::Receiver<Vec<u8>>, mpsc::Receiver<Vec<u8>>) {
        let (weather_tx, weather_rx) = mpsc::channel(capacity);
        let (exchange_tx, exchange_rx) = mpsc::channel(capacity);
        let mux = Multiplexer::new()
            .register("weather", weather_tx)
            .register("exchange", exchange_tx);
        (mux, weather_rx, exchange_rx)
    }

    #[tokio::test]
    async fn recognized_types_land_on_their_channel() {
        let (mux, mut weather_rx, mut exchange_rx) = mux_with_channels(4);

        mux.route(br#"{"type":"weather","args":{"city":"Moscow"}}"#.to_vec());
        mux.route(br#"{"type":"exchange","args":{"base":"USD","target":"EUR"}}"#.to_vec());

        assert!(weather_rx.try_recv().is_ok());
        assert!(exchange_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn unknown_and_untyped_messages_are_dropped() {
        let (mux, mut weather_rx, mut exchange_rx) = mux_with_channels(4);

        mux.route(br#"{"type":"stocks","args":{}}"#.to_vec());
        mux.route(br#"{"city":"Moscow","temp_celsius":5.0}"#.to_vec());
        mux.route(b"not json".to_vec());

        assert!(weather_rx.try_recv().is_err());
        assert!(exchange_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_blocking() {
        let (mux, mut weather_rx, _exchange_rx) = mux_with_channels(1);
        let message = br#"{"type":"weather","args":{"city":"Moscow"}}"#.to_vec();

        mux.route(message.clone());
        mux.route(message.clone()); // dropped, channel is full

        assert!(weather_rx.try_recv().is_ok());
        assert!(weather_rx.try_recv().is_err());
    }
}
