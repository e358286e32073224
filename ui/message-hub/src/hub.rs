//! The UI Message Hub (spec §4.1): client registry, broadcast fan-out,
//! and inbound dispatch, wired the way [`paige_observer::ObserverHandle`]
//! wires its own event-bus subscription — a clone of the shared
//! `broadcast::Sender<ServerMessage>` is subscribed once at construction
//! and relayed to every connected client's egress queue.

use std::collections::HashMap;
use std::sync::Arc;

use paige_protocol::ServerMessage;
use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::client::ClientHandle;
use crate::client::ClientId;
use crate::handlers::Handler;
use crate::handlers::HandlerRegistry;

/// Owns every connected client's egress queue and the inbound handler
/// registry. Cheap to share via `Arc`; `connect`/`disconnect` and
/// `broadcast` all take `&self`.
pub struct Hub {
    clients: RwLock<HashMap<ClientId, ClientHandle>>,
    handlers: HandlerRegistry,
}

impl Hub {
    /// Builds a hub and starts the task relaying `broadcast_tx` into
    /// every connected client's egress queue. The returned `JoinHandle`
    /// is for process-shutdown cleanup; the hub itself does not need it.
    pub fn start(broadcast_tx: broadcast::Sender<ServerMessage>) -> (Arc<Self>, JoinHandle<()>) {
        let hub = Arc::new(Self {
            clients: RwLock::new(HashMap::new()),
            handlers: HandlerRegistry::new(),
        });
        let relay_hub = hub.clone();
        let mut rx = broadcast_tx.subscribe();
        let relay_task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) => relay_hub.broadcast(message).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "ui hub broadcast relay lagged, frames dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        (hub, relay_task)
    }

    /// Registers a new client with a fresh identifier (spec §4.1
    /// "Failure semantics": never reused across reconnects).
    pub async fn connect(&self) -> ClientHandle {
        let handle = ClientHandle::new(ClientId::new());
        self.clients.write().await.insert(handle.id, handle.clone());
        handle
    }

    /// Releases a client's registration. Global handler wiring is
    /// untouched — only this client's egress queue is dropped.
    pub async fn disconnect(&self, id: ClientId) {
        if let Some(handle) = self.clients.write().await.remove(&id) {
            handle.queue.close().await;
        }
    }

    pub async fn on(&self, message_type: &'static str, handler: Handler) {
        self.handlers.on(message_type, handler).await;
    }

    /// Dispatches one inbound client message to every handler registered
    /// for its type. Errors are logged by the registry, never surfaced
    /// to the caller — per spec §4.1 the client stays connected.
    pub async fn dispatch_inbound(
        &self,
        client_id: ClientId,
        message_type: &str,
        payload: serde_json::Value,
    ) {
        self.handlers.dispatch(client_id, message_type, payload).await;
    }

    /// Sends `message` to every connected client. A slow client's full
    /// queue applies the overflow-drop policy (spec §4.1) rather than
    /// blocking this call or any other client's delivery.
    pub async fn broadcast(&self, message: ServerMessage) {
        let clients = self.clients.read().await;
        for handle in clients.values() {
            let _ = handle.send(message.clone()).await;
        }
    }

    /// Sends `message` to one client only, e.g. the handshake reply.
    /// Returns `false` if the client is no longer registered.
    pub async fn send_to(&self, id: ClientId, message: ServerMessage) -> bool {
        let handle = { self.clients.read().await.get(&id).cloned() };
        match handle {
            Some(handle) => handle.send(message).await,
            None => false,
        }
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

#[cfg(test)]
#[path = "hub.test.rs"]
mod tests;
