use super::*;

#[test]
fn client_ids_are_unique_per_construction() {
    let a = ClientId::new();
    let b = ClientId::new();
    assert_ne!(a, b);
}

#[tokio::test]
async fn send_enqueues_onto_the_client_egress_queue() {
    let handle = ClientHandle::new(ClientId::new());
    assert!(
        handle
            .send(ServerMessage::ConnectionError(
                paige_protocol::ErrorPayload {
                    message: "x".to_string(),
                    path: None,
                }
            ))
            .await
    );
    let popped = handle.queue.pop().await.expect("popped");
    assert_eq!(popped.type_name(), "connection:error");
}
