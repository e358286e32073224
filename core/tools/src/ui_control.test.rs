use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast;

use paige_action_log::ActionLogStore;
use paige_buffer_cache::BufferCache;
use paige_session::SessionRegistry;

use super::*;

fn test_context(dir: &tempfile::TempDir) -> (ToolContext, broadcast::Receiver<ServerMessage>) {
    let action_log = Arc::new(ActionLogStore::open(dir.path()).expect("open action log"));
    let (tx, rx) = broadcast::channel(16);
    let session_registry =
        SessionRegistry::new(action_log.clone(), tx.clone(), Duration::from_secs(3600));
    let buffer_cache = Arc::new(BufferCache::new());
    let ctx = ToolContext::new(
        dir.path().to_path_buf(),
        action_log,
        session_registry,
        buffer_cache,
        tx,
    );
    (ctx, rx)
}

#[tokio::test]
async fn open_file_marks_open_and_broadcasts_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, mut rx) = test_context(&dir);
    std::fs::write(dir.path().join("a.rs"), "fn a() {}").expect("write");

    let result = OpenFile
        .execute(json!({"path": "a.rs"}), &ctx)
        .await
        .expect("ok");
    assert_eq!(result["success"], json!(true));
    assert_eq!(ctx.open_files().len(), 1);
    assert!(matches!(
        rx.try_recv().expect("message"),
        ServerMessage::BufferContent(_)
    ));
}

#[tokio::test]
async fn open_file_missing_on_disk_is_file_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, _rx) = test_context(&dir);
    let err = OpenFile
        .execute(json!({"path": "missing.rs"}), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, PaigeError::FileNotFound { .. }));
}

#[tokio::test]
async fn highlight_lines_broadcasts_decorations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, mut rx) = test_context(&dir);
    let result = HighlightLines
        .execute(
            json!({"path": "a.rs", "ranges": [{"start": 1, "end": 3, "style": "info"}]}),
            &ctx,
        )
        .await
        .expect("ok");
    assert_eq!(result["success"], json!(true));
    assert!(matches!(
        rx.try_recv().expect("message"),
        ServerMessage::EditorDecorations(_)
    ));
}

#[tokio::test]
async fn clear_highlights_without_path_clears_all() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, mut rx) = test_context(&dir);
    ctx.set_highlights(
        dir.path().join("a.rs"),
        vec![HighlightRange {
            start: 1,
            end: 2,
            style: "info".to_string(),
        }],
    );
    ClearHighlights
        .execute(json!({}), &ctx)
        .await
        .expect("ok");
    assert!(matches!(
        rx.try_recv().expect("message"),
        ServerMessage::EditorClearDecorations(_)
    ));
}

#[tokio::test]
async fn hint_files_rejects_path_outside_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, _rx) = test_context(&dir);
    let err = HintFiles
        .execute(
            json!({"paths": ["../../etc/passwd"], "style": "subtle"}),
            &ctx,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PaigeError::PathEscapesRoot { .. }));
}

#[tokio::test]
async fn clear_hints_broadcasts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, mut rx) = test_context(&dir);
    ClearHints.execute(json!({}), &ctx).await.expect("ok");
    assert!(matches!(
        rx.try_recv().expect("message"),
        ServerMessage::ExplorerClearHints(_)
    ));
}

#[tokio::test]
async fn update_phase_broadcasts_transition() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, mut rx) = test_context(&dir);
    UpdatePhase
        .execute(json!({"phase": 2, "status": "active"}), &ctx)
        .await
        .expect("ok");
    match rx.try_recv().expect("message") {
        ServerMessage::PhaseTransition(phase) => {
            assert_eq!(phase.number, 2);
            assert_eq!(phase.status, PhaseStatus::Active);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn show_message_broadcasts_coaching_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, mut rx) = test_context(&dir);
    ShowMessage
        .execute(json!({"message": "nice work", "type": "success"}), &ctx)
        .await
        .expect("ok");
    match rx.try_recv().expect("message") {
        ServerMessage::CoachingMessage(msg) => {
            assert_eq!(msg.body, "nice work");
            assert_eq!(msg.trigger, NudgeTrigger::Manual);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn show_issue_context_broadcasts_dashboard_issue() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, mut rx) = test_context(&dir);
    ShowIssueContext
        .execute(json!({"title": "Bug #1", "summary": "crashes on save"}), &ctx)
        .await
        .expect("ok");
    assert!(matches!(
        rx.try_recv().expect("message"),
        ServerMessage::DashboardIssue(_)
    ));
}
