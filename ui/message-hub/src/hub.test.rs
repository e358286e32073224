use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use paige_protocol::CoachingMessage;
use paige_protocol::NudgeTrigger;
use serde_json::json;
use tokio::sync::broadcast;

use super::*;

fn nudge() -> ServerMessage {
    ServerMessage::ObserverNudge(CoachingMessage {
        id: 1,
        session_id: 1,
        trigger: NudgeTrigger::Manual,
        confidence: 0.9,
        title: "t".to_string(),
        body: "b".to_string(),
        delivered_at: chrono::Utc::now(),
    })
}

#[tokio::test]
async fn connect_assigns_distinct_ids_and_tracks_client_count() {
    let (tx, _rx) = broadcast::channel(8);
    let (hub, _relay) = Hub::start(tx);

    let a = hub.connect().await;
    let b = hub.connect().await;
    assert_ne!(a.id, b.id);
    assert_eq!(hub.client_count().await, 2);

    hub.disconnect(a.id).await;
    assert_eq!(hub.client_count().await, 1);
}

#[tokio::test]
async fn broadcast_reaches_every_connected_client() {
    let (tx, _rx) = broadcast::channel(8);
    let (hub, _relay) = Hub::start(tx);

    let a = hub.connect().await;
    let b = hub.connect().await;

    hub.broadcast(nudge()).await;

    assert!(a.queue.pop().await.is_some());
    assert!(b.queue.pop().await.is_some());
}

#[tokio::test]
async fn shared_broadcast_sender_is_relayed_into_connected_clients() {
    let (tx, _rx) = broadcast::channel(8);
    let (hub, _relay) = Hub::start(tx.clone());
    let client = hub.connect().await;

    tx.send(nudge()).expect("send");
    // Give the relay task a turn to run.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let received = client.queue.pop().await.expect("received");
    assert_eq!(received.type_name(), "observer:nudge");
}

#[tokio::test]
async fn dispatch_inbound_invokes_registered_handler() {
    let (tx, _rx) = broadcast::channel(8);
    let (hub, _relay) = Hub::start(tx);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls2 = calls.clone();
    hub.on(
        "user:explain",
        Arc::new(move |_id, _payload| {
            let calls2 = calls2.clone();
            Box::pin(async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }),
    )
    .await;

    let client = hub.connect().await;
    hub.dispatch_inbound(client.id, "user:explain", json!({"question": "why"}))
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
