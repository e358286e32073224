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
    let session_registry =
        SessionRegistry::new(action_log.clone(), tx.clone(), Duration::from_secs(3600));
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
async fn get_buffer_returns_null_when_untracked() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let result = GetBuffer
        .execute(json!({"path": "a.rs"}), &ctx)
        .await
        .expect("no error");
    assert!(result.is_null());
}

#[tokio::test]
async fn get_buffer_returns_content_and_dirty_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let abs = dir.path().join("a.rs");
    ctx.buffer_cache.update(&abs, "fn a() {}".to_string());

    let result = GetBuffer
        .execute(json!({"path": "a.rs"}), &ctx)
        .await
        .expect("no error");
    assert_eq!(result["content"], json!("fn a() {}"));
    assert_eq!(result["dirty"], json!(true));
}

#[tokio::test]
async fn get_buffer_rejects_traversal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let err = GetBuffer
        .execute(json!({"path": "../../etc/passwd"}), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, PaigeError::PathEscapesRoot { .. }));
}

#[tokio::test]
async fn get_open_files_reflects_marked_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    ctx.mark_open(dir.path().join("a.rs"));
    let result = GetOpenFiles.execute(json!({}), &ctx).await.expect("ok");
    let files = result["files"].as_array().expect("array");
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn get_diff_reports_unified_diff_for_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let abs = dir.path().join("a.rs");
    std::fs::write(&abs, "fn a() {}\n").expect("write");
    ctx.buffer_cache
        .update(&abs, "fn a() { todo!() }\n".to_string());

    let result = GetDiff
        .execute(json!({"path": "a.rs"}), &ctx)
        .await
        .expect("ok");
    let diff = result["diff"].as_str().expect("string");
    assert!(diff.contains("-fn a() {}"));
    assert!(diff.contains("+fn a() { todo!() }"));
}

#[tokio::test]
async fn get_diff_without_path_covers_all_dirty_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let abs = dir.path().join("a.rs");
    std::fs::write(&abs, "old\n").expect("write");
    ctx.buffer_cache.update(&abs, "new\n".to_string());

    let result = GetDiff.execute(json!({}), &ctx).await.expect("ok");
    let diff = result["diff"].as_str().expect("string");
    assert!(diff.contains("-old"));
    assert!(diff.contains("+new"));
}

#[tokio::test]
async fn get_session_state_errors_without_active_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    let err = GetSessionState.execute(json!({}), &ctx).await.unwrap_err();
    assert!(matches!(err, PaigeError::NoActiveSession));
}

#[tokio::test]
async fn get_session_state_reports_session_and_open_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(&dir);
    ctx.session_registry
        .start(dir.path().to_path_buf(), None, None, None, None)
        .await
        .expect("starts");
    ctx.mark_open(dir.path().join("a.rs"));

    let result = GetSessionState.execute(json!({}), &ctx).await.expect("ok");
    assert_eq!(result["session"]["id"], json!(1));
    assert_eq!(result["open_files"].as_array().expect("array").len(), 1);
}
