//! Per-connection websocket plumbing: a reader loop dispatching inbound
//! frames and a writer loop draining the client's egress queue, spawned
//! independently so a slow writer never stalls inbound dispatch (spec
//! §4.1, §5).

use std::sync::Arc;

use axum::extract::ws::Message;
use axum::extract::ws::WebSocket;
use futures::SinkExt;
use futures::StreamExt;
use paige_error::PaigeError;
use paige_protocol::Envelope;
use paige_protocol::ErrorPayload;
use paige_protocol::ServerMessage;

use crate::hub::Hub;
use crate::inbound::parse_inbound;

/// Owns one websocket connection end to end: registers with the hub,
/// runs reader/writer tasks concurrently, and deregisters on exit.
pub async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let handle = hub.connect().await;
    let client_id = handle.id;
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(message) = handle.queue.pop().await {
            let frame = Envelope::new(message);
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(%err, "failed to serialize outbound frame");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        match parse_inbound(&text) {
            Ok(frame) => {
                hub.dispatch_inbound(client_id, frame.type_name, frame.payload)
                    .await;
            }
            Err(err) => {
                send_validation_error(&hub, client_id, &err).await;
            }
        }
    }

    hub.disconnect(client_id).await;
    writer.abort();
}

async fn send_validation_error(hub: &Arc<Hub>, client_id: crate::client::ClientId, err: &PaigeError) {
    let payload = ErrorPayload {
        message: err.to_string(),
        path: None,
    };
    hub.send_to(client_id, ServerMessage::ErrorGeneral(payload)).await;
}

#[cfg(test)]
#[path = "connection.test.rs"]
mod tests;
