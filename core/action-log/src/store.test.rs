use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use paige_protocol::Session;
use tempfile::TempDir;

use super::*;

async fn store_with_session() -> (ActionLogStore, u64, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ActionLogStore::open(dir.path()).expect("open store");
    let session = Session::new(1, PathBuf::from("/proj"));
    store.insert_session(session).await.expect("insert session");
    (store, 1, dir)
}

#[tokio::test]
async fn log_action_persists_and_publishes() {
    let (store, session_id, _dir) = store_with_session().await;
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = seen.clone();
    store.events().subscribe(move |event| {
        assert_eq!(event.session_id, session_id);
        seen_clone.fetch_add(1, Ordering::SeqCst);
    });

    store
        .log_action(
            session_id,
            ActionType::BufferUpdated,
            Some(serde_json::json!({"path": "a.rs"})),
        )
        .await
        .expect("log action");

    assert_eq!(seen.load(Ordering::SeqCst), 1);

    let actions = store.actions_by_session(session_id).await.expect("query");
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action_type, ActionType::BufferUpdated);
}

#[tokio::test]
async fn actions_recent_orders_descending() {
    let (store, session_id, _dir) = store_with_session().await;
    for _ in 0..3 {
        store
            .log_action(session_id, ActionType::ExplainRequested, None)
            .await
            .expect("log action");
    }
    let recent = store
        .actions_recent(session_id, 2)
        .await
        .expect("recent query");
    assert_eq!(recent.len(), 2);
}

#[tokio::test]
async fn api_call_cost_accumulates() {
    let (store, session_id, _dir) = store_with_session().await;
    store
        .log_api_call(
            session_id,
            "observer.classifier".to_string(),
            "haiku".to_string(),
            1000,
            200,
            0.0012,
            450,
            true,
        )
        .await
        .expect("log api call");
    store
        .log_api_call(
            session_id,
            "coaching.plan".to_string(),
            "sonnet".to_string(),
            2000,
            500,
            0.0210,
            900,
            true,
        )
        .await
        .expect("log api call");

    let total = store
        .total_cost_for_session(session_id)
        .await
        .expect("total cost");
    assert!((total - 0.0222).abs() < 1e-9);

    let calls = store
        .api_calls_by_session(session_id)
        .await
        .expect("api calls");
    assert_eq!(calls.len(), 2);
}

#[tokio::test]
async fn get_session_round_trips_fields() {
    let (store, session_id, _dir) = store_with_session().await;
    let session = store.get_session(session_id).await.expect("get session");
    assert_eq!(session.id, session_id);
    assert_eq!(session.project_dir, PathBuf::from("/proj"));
    assert_eq!(session.status, paige_protocol::SessionStatus::Active);
}

#[tokio::test]
async fn get_session_rejects_unknown_id() {
    let (store, _session_id, _dir) = store_with_session().await;
    let err = store.get_session(999).await.expect_err("should fail");
    assert!(matches!(err, PaigeError::UnknownSession { session_id } if session_id == 999));
}

#[tokio::test]
async fn failed_api_call_logs_negative_latency() {
    let (store, session_id, _dir) = store_with_session().await;
    let entry = store
        .log_api_call(
            session_id,
            "observer.classifier".to_string(),
            "haiku".to_string(),
            0,
            0,
            0.0,
            -1,
            false,
        )
        .await
        .expect("log failed call");
    assert!(!entry.succeeded);
    assert_eq!(entry.latency_ms, 0);
}
