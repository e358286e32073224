//! Inbound handler registry (spec §4.1 `On(type, handler)`).
//!
//! Dispatch errors are logged, never propagated to the sending client —
//! the connection that sent a malformed-for-its-handler payload stays
//! open, matching the "Send" contract's failure note.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use paige_error::PaigeError;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::client::ClientId;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), PaigeError>> + Send>>;
pub type Handler = Arc<dyn Fn(ClientId, Value) -> HandlerFuture + Send + Sync>;

/// Maps message type → ordered list of handlers. Multiple handlers per
/// type run in registration order (spec §4.1).
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<&'static str, Vec<Handler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn on(&self, message_type: &'static str, handler: Handler) {
        let mut guard = self.handlers.write().await;
        guard.entry(message_type).or_default().push(handler);
    }

    /// Invokes every handler registered for `message_type`, in
    /// registration order, awaiting each before starting the next —
    /// this is what makes per-connection dispatch FIFO (spec §5).
    pub async fn dispatch(&self, client_id: ClientId, message_type: &str, payload: Value) {
        let handlers = {
            let guard = self.handlers.read().await;
            guard.get(message_type).cloned().unwrap_or_default()
        };
        for handler in handlers {
            if let Err(err) = handler(client_id, payload.clone()).await {
                tracing::warn!(%client_id, message_type, %err, "inbound handler failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "handlers.test.rs"]
mod tests;
