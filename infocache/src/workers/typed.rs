use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::WorkerHandler;
use crate::store::KeyValueStore;

/// Drains a typed channel and writes resolved values to the store with
/// the handler's TTL. Malformed payloads are logged and dropped; the
/// loop only exits on cancellation or channel close, and an in-flight
/// message always finishes first.
pub struct TypedWorker<H: WorkerHandler> {
    messages: mpsc::Receiver<Vec<u8>>,
    store: Arc<dyn KeyValueStore>,
    handler: H,
}

impl<H: WorkerHandler> TypedWorker<H> {
    pub fn new(
        messages: mpsc::Receiver<Vec<u8>>,
        store: Arc<dyn KeyValueStore>,
        handler: H,
    ) -> Self {
        Self {
            messages,
            store,
            handler,
        }
    }

    pub fn start(mut self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(kind = self.handler.kind(), "worker started");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    message = self.messages.recv() => match message {
                        Some(payload) => self.process(&payload).await,
                        None => break,
                    }
                }
            }
            info!(kind = self.handler.kind(), "worker stopped");
        })
    }

    async fn process(&self, payload: &[u8]) {
        let (value, key) = match self.handler.resolve(payload).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(kind = self.handler.kind(), error = %e, "message dropped");
                return;
            }
        };

        let data = match serde_json::to_vec(&value) {
            Ok(data) => data,
            Err(e) => {
                warn!(kind = self.handler.kind(), error = %e, "serialize failed, dropping");
                return;
            }
        };

        if let Err(e) = self.store.put(&key, data, self.handler.ttl()).await {
            warn!(%key, error = %e, "store write failed");
        } else {
            info!(kind = self.handler.kind(), %key, "cached");
        }
    }
}
