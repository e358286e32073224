//! The connection handshake (spec §4.1): on `connection:ready`, the hub
//! replies `connection:hello` then `connection:init`.

use std::sync::Arc;

use paige_protocol::ConnectionInit;
use paige_protocol::ServerHello;
use paige_protocol::ServerMessage;

use crate::hub::Hub;

/// What the handshake's `connection:init` reply needs from the rest of
/// the process — queried fresh on every handshake, since a client can
/// reconnect mid-session.
pub trait SessionLookup: Send + Sync {
    fn active_session_id(&self) -> Option<u64>;
}

/// Registers the `connection:ready` handler that drives the handshake.
/// `server_id`/`version` identify this process instance; `capabilities`
/// and `feature_flags` are advertised verbatim in both replies.
pub async fn register(
    hub: &Arc<Hub>,
    server_id: String,
    version: String,
    capabilities: Vec<String>,
    feature_flags: Vec<String>,
    sessions: Arc<dyn SessionLookup>,
) {
    let hub_for_handler = hub.clone();
    hub.on(
        "connection:ready",
        Arc::new(move |client_id, _payload| {
            let hub = hub_for_handler.clone();
            let server_id = server_id.clone();
            let version = version.clone();
            let capabilities = capabilities.clone();
            let feature_flags = feature_flags.clone();
            let sessions = sessions.clone();
            Box::pin(async move {
                hub.send_to(
                    client_id,
                    ServerMessage::ConnectionHello(ServerHello {
                        server_id,
                        version,
                        capabilities: capabilities.clone(),
                    }),
                )
                .await;
                hub.send_to(
                    client_id,
                    ServerMessage::ConnectionInit(ConnectionInit {
                        session_id: sessions.active_session_id(),
                        capabilities,
                        feature_flags,
                    }),
                )
                .await;
                Ok(())
            })
        }),
    )
    .await;
}

#[cfg(test)]
#[path = "handshake.test.rs"]
mod tests;
