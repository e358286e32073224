use std::time::Duration;

use axum::extract::State;
use axum::Json;
use paige_action_log::ActionLogStore;
use paige_buffer_cache::BufferCache;
use paige_session::SessionRegistry;
use tokio::sync::broadcast;

use super::*;

async fn test_state() -> ToolState {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = Arc::new(ActionLogStore::open(dir.path()).expect("open"));
    let (broadcast_tx, _rx) = broadcast::channel(8);
    let session_registry = SessionRegistry::new(action_log.clone(), broadcast_tx.clone(), Duration::from_secs(3600));
    let context = Arc::new(ToolContext::new(
        dir.path().to_path_buf(),
        action_log,
        session_registry,
        Arc::new(BufferCache::new()),
        broadcast_tx,
    ));
    ToolState {
        registry: Arc::new(paige_tools::build_registry()),
        context,
    }
}

#[tokio::test]
async fn list_tools_returns_all_fourteen_definitions() {
    let state = test_state().await;
    let Json(definitions) = list_tools(State(state)).await;
    assert_eq!(definitions.len(), paige_tools::EXPECTED_TOOL_NAMES.len());
}

#[tokio::test]
async fn call_tool_dispatches_to_the_registry() {
    let state = test_state().await;
    let request = ToolCallRequest {
        name: "paige_get_open_files".to_string(),
        call_id: "call-1".to_string(),
        input: serde_json::json!({}),
    };
    let result = call_tool(State(state), Json(request)).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn call_tool_maps_unknown_tool_name_to_an_error_response() {
    let state = test_state().await;
    let request = ToolCallRequest {
        name: "paige_does_not_exist".to_string(),
        call_id: "call-1".to_string(),
        input: serde_json::json!({}),
    };
    let result = call_tool(State(state), Json(request)).await;
    assert!(result.is_err());
}
