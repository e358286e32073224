//! Per-client identity and registration handle (spec §4.1).

use std::sync::Arc;

use paige_protocol::ServerMessage;
use uuid::Uuid;

use crate::egress::EgressQueue;

/// Fresh per-connection identifier. A reconnecting client (even for the
/// same session) gets a new one — the hub never reuses a disconnected
/// client's id (spec §4.1 "Failure semantics").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-client egress queue depth before overflow-drop kicks in.
pub const EGRESS_QUEUE_CAPACITY: usize = 256;

/// Message types dropped first on egress overflow, in the order spec
/// §4.1 lists them. `buffer:content` is this process's outbound mirror
/// of the client's `buffer:update`; no outbound analog of
/// `editor:cursor`/`editor:scroll` exists in the closed server→client
/// set (§6), so only the shape that does exist is listed here.
pub const LOW_PRIORITY_TYPES: &[&str] = &["buffer:content"];

pub(crate) fn is_low_priority(message: &ServerMessage) -> bool {
    LOW_PRIORITY_TYPES.contains(&message.type_name())
}

/// A registered client: the egress queue its connection task drains to
/// feed the websocket write half.
#[derive(Clone)]
pub struct ClientHandle {
    pub id: ClientId,
    pub(crate) queue: Arc<EgressQueue>,
}

impl ClientHandle {
    pub(crate) fn new(id: ClientId) -> Self {
        Self {
            id,
            queue: Arc::new(EgressQueue::new(EGRESS_QUEUE_CAPACITY)),
        }
    }

    /// Enqueues a frame for this client alone, bypassing broadcast fan-out.
    pub async fn send(&self, message: ServerMessage) -> bool {
        self.queue.push(message).await
    }
}

#[cfg(test)]
#[path = "client.test.rs"]
mod tests;
