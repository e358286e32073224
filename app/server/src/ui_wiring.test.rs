use std::time::Duration;

use paige_buffer_cache::BufferCache;
use paige_coaching::CoachingPipeline;
use paige_memory_store::NoopMemoryStore;
use paige_model_client::NoopModelClient;
use paige_session::SessionRegistry;
use paige_ui_hub::Hub;
use tokio::sync::broadcast;

use super::*;

async fn test_wiring(project_dir: PathBuf) -> (Wiring, Arc<Hub>, broadcast::Receiver<ServerMessage>) {
    let action_log = Arc::new(ActionLogStore::open(&project_dir).expect("open"));
    let (broadcast_tx, rx) = broadcast::channel(32);
    let session_registry =
        SessionRegistry::new(action_log.clone(), broadcast_tx.clone(), Duration::from_secs(3600));
    let buffer_cache = Arc::new(BufferCache::new());
    let coaching = Arc::new(CoachingPipeline::new(
        action_log.clone(),
        Arc::new(NoopMemoryStore::new()),
        Arc::new(NoopModelClient),
        broadcast_tx.clone(),
    ));
    let (hub, _relay) = Hub::start(broadcast_tx.clone());

    let wiring = Wiring {
        project_dir,
        action_log,
        session_registry,
        buffer_cache,
        coaching,
        broadcast_tx,
    };
    (wiring, hub, rx)
}

#[tokio::test]
async fn file_open_broadcasts_buffer_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.rs"), "fn a() {}").expect("write");
    let (wiring, hub, mut rx) = test_wiring(dir.path().to_path_buf()).await;
    register_file_open(&hub, wiring.clone()).await;

    hub.dispatch_inbound(
        paige_ui_hub::ClientId::new(),
        "file:open",
        serde_json::json!({ "path": "a.rs" }),
    )
    .await;

    let message = rx.recv().await.expect("broadcast");
    assert_eq!(message.type_name(), "buffer:content");
}

#[tokio::test]
async fn buffer_update_on_first_write_logs_a_significant_change() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (wiring, hub, _rx) = test_wiring(dir.path().to_path_buf()).await;
    wiring
        .session_registry
        .start(dir.path().to_path_buf(), None, None, None, None)
        .await
        .expect("starts");
    register_buffer_update(&hub, wiring.clone()).await;

    hub.dispatch_inbound(
        paige_ui_hub::ClientId::new(),
        "buffer:update",
        serde_json::json!({ "path": "a.rs", "content": "fn a() {}" }),
    )
    .await;

    let session_id = wiring.active_session_id().expect("active");
    let actions = wiring
        .action_log
        .actions_by_type(session_id, ActionType::BufferSignificantChange)
        .await
        .expect("actions");
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].payload["kind"], "significant_change");
}

#[tokio::test]
async fn phase_expand_step_logs_phase_completed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (wiring, hub, _rx) = test_wiring(dir.path().to_path_buf()).await;
    wiring
        .session_registry
        .start(dir.path().to_path_buf(), None, None, None, None)
        .await
        .expect("starts");
    register_phase_expand_step(&hub, wiring.clone()).await;

    hub.dispatch_inbound(
        paige_ui_hub::ClientId::new(),
        "phase:expand_step",
        serde_json::json!({ "phase": 1, "step": "write tests" }),
    )
    .await;

    let session_id = wiring.active_session_id().expect("active");
    let actions = wiring
        .action_log
        .actions_by_type(session_id, ActionType::PhaseCompleted)
        .await
        .expect("actions");
    assert_eq!(actions.len(), 1);
}

#[tokio::test]
async fn user_explain_logs_an_explain_requested_action() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (wiring, hub, _rx) = test_wiring(dir.path().to_path_buf()).await;
    wiring
        .session_registry
        .start(dir.path().to_path_buf(), None, None, None, None)
        .await
        .expect("starts");
    register_user_explain(&hub, wiring.clone()).await;

    hub.dispatch_inbound(
        paige_ui_hub::ClientId::new(),
        "user:explain",
        serde_json::json!({ "question": "why?" }),
    )
    .await;

    let session_id = wiring.active_session_id().expect("active");
    let actions = wiring
        .action_log
        .actions_by_type(session_id, ActionType::ExplainRequested)
        .await
        .expect("actions");
    assert_eq!(actions.len(), 1);
}

#[tokio::test]
async fn missing_path_field_is_logged_and_does_not_panic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (wiring, hub, _rx) = test_wiring(dir.path().to_path_buf()).await;
    register_file_close(&hub, wiring).await;

    hub.dispatch_inbound(paige_ui_hub::ClientId::new(), "file:close", serde_json::json!({}))
        .await;
}
