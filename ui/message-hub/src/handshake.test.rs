use tokio::sync::broadcast;

use super::*;

struct FixedSession(Option<u64>);

impl SessionLookup for FixedSession {
    fn active_session_id(&self) -> Option<u64> {
        self.0
    }
}

#[tokio::test]
async fn connection_ready_triggers_hello_then_init() {
    let (tx, _rx) = broadcast::channel(8);
    let (hub, _relay) = Hub::start(tx);
    register(
        &hub,
        "paige-1".to_string(),
        "0.1.0".to_string(),
        vec!["coaching".to_string()],
        vec!["observer".to_string()],
        Arc::new(FixedSession(Some(7))),
    )
    .await;

    let client = hub.connect().await;
    hub.dispatch_inbound(client.id, "connection:ready", serde_json::json!(null))
        .await;

    let hello = client.queue.pop().await.expect("hello");
    assert_eq!(hello.type_name(), "connection:hello");
    let init = client.queue.pop().await.expect("init");
    assert_eq!(init.type_name(), "connection:init");
    match init {
        ServerMessage::ConnectionInit(payload) => assert_eq!(payload.session_id, Some(7)),
        other => panic!("unexpected message: {}", other.type_name()),
    }
}
