use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde_json::json;

use super::*;

#[tokio::test]
async fn handlers_for_a_type_run_in_registration_order() {
    let registry = HandlerRegistry::new();
    let order: Arc<tokio::sync::Mutex<Vec<u8>>> = Arc::new(tokio::sync::Mutex::new(Vec::new()));

    let order1 = order.clone();
    registry
        .on(
            "buffer:update",
            Arc::new(move |_id, _payload| {
                let order1 = order1.clone();
                Box::pin(async move {
                    order1.lock().await.push(1);
                    Ok(())
                })
            }),
        )
        .await;
    let order2 = order.clone();
    registry
        .on(
            "buffer:update",
            Arc::new(move |_id, _payload| {
                let order2 = order2.clone();
                Box::pin(async move {
                    order2.lock().await.push(2);
                    Ok(())
                })
            }),
        )
        .await;

    registry
        .dispatch(ClientId::new(), "buffer:update", json!({}))
        .await;

    assert_eq!(*order.lock().await, vec![1, 2]);
}

#[tokio::test]
async fn dispatch_to_an_unregistered_type_is_a_no_op() {
    let registry = HandlerRegistry::new();
    // Must not panic and must not call any handler.
    registry
        .dispatch(ClientId::new(), "phase:expand_step", json!({}))
        .await;
}

#[tokio::test]
async fn a_failing_handler_does_not_stop_later_handlers() {
    let registry = HandlerRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));

    registry
        .on(
            "user:explain",
            Arc::new(|_id, _payload| {
                Box::pin(async move {
                    Err(PaigeError::Validation {
                        message: "boom".to_string(),
                    })
                })
            }),
        )
        .await;
    let calls2 = calls.clone();
    registry
        .on(
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

    registry
        .dispatch(ClientId::new(), "user:explain", json!({}))
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
