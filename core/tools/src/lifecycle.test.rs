use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast;

use paige_action_log::ActionLogStore;
use paige_buffer_cache::BufferCache;
use paige_session::SessionRegistry;

use super::*;

fn test_context(dir: &tempfile::TempDir) -> ToolContext {
    let action_log = Arc::new(ActionLogStore::open(dir.path()).expect("open action log"));
    let (tx, _rx) = broadcast::channel(16);
    let session_registry = SessionRegistry::new(action_log.clone(), tx.clone(), Duration::from_secs(3600));
    let buffer_cache = Arc::new(BufferCache::new());
    ToolContext::new(
        dir.path().to_path_buf(),
        action_log,
        session_registry,
        buffer_cache,
        tx,
    )
}

#[tokio::test]
async fn start_session_returns_session_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let tool = StartSession;
    let result = tool
        .execute(json!({"project_dir": "/proj"}), &ctx)
        .await
        .expect("starts");
    assert_eq!(result["session_id"], json!(1));
    assert_eq!(result["status"], json!("active"));
}

#[tokio::test]
async fn start_session_twice_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let tool = StartSession;
    tool.execute(json!({"project_dir": "/proj"}), &ctx)
        .await
        .expect("starts");
    let err = tool
        .execute(json!({"project_dir": "/proj"}), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, PaigeError::SessionAlreadyActive));
}

#[tokio::test]
async fn end_session_without_active_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let err = EndSession.execute(json!({}), &ctx).await.unwrap_err();
    assert!(matches!(err, PaigeError::NoActiveSession));
}

#[tokio::test]
async fn end_session_after_start_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    StartSession
        .execute(json!({"project_dir": "/proj"}), &ctx)
        .await
        .expect("starts");
    let result = EndSession.execute(json!({}), &ctx).await.expect("ends");
    assert_eq!(result["success"], json!(true));
    assert_eq!(result["session_id"], json!(1));
}
