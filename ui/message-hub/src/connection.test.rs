use std::time::Duration;

use paige_error::PaigeError;
use tokio::sync::broadcast;
use tokio::time::timeout;

use super::*;

#[tokio::test]
async fn send_validation_error_reaches_the_originating_client_only() {
    let (tx, _rx) = broadcast::channel(8);
    let (hub, _relay) = Hub::start(tx);
    let a = hub.connect().await;
    let b = hub.connect().await;

    send_validation_error(
        &hub,
        a.id,
        &PaigeError::Validation {
            message: "bad envelope".to_string(),
        },
    )
    .await;

    let received = a.queue.pop().await.expect("a received");
    assert_eq!(received.type_name(), "error:general");

    // b never had anything queued; pop() would hang forever without a
    // close, so bound the wait instead of asserting on a blocking call.
    assert!(timeout(Duration::from_millis(20), b.queue.pop()).await.is_err());
}
