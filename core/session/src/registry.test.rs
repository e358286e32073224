use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::broadcast;

use super::*;

async fn fresh_registry(idle_timeout: Duration) -> (Arc<SessionRegistry>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = Arc::new(ActionLogStore::open(dir.path()).expect("open store"));
    let (tx, _rx) = broadcast::channel(16);
    (SessionRegistry::new(action_log, tx, idle_timeout), dir)
}

#[tokio::test]
async fn start_rejects_a_second_active_session() {
    let (registry, _dir) = fresh_registry(Duration::from_secs(900)).await;
    registry
        .start(PathBuf::from("/proj"), None, None, None, None)
        .await
        .expect("first start");

    let err = registry
        .start(PathBuf::from("/proj"), None, None, None, None)
        .await
        .expect_err("second start should fail");
    assert!(matches!(err, PaigeError::SessionAlreadyActive));
}

#[tokio::test]
async fn end_rejects_when_nothing_active() {
    let (registry, _dir) = fresh_registry(Duration::from_secs(900)).await;
    let err = registry
        .end(EndReason::Completed)
        .await
        .expect_err("should fail");
    assert!(matches!(err, PaigeError::NoActiveSession));
}

#[tokio::test]
async fn end_transitions_status_and_allows_new_start() {
    let (registry, _dir) = fresh_registry(Duration::from_secs(900)).await;
    let session = registry
        .start(PathBuf::from("/proj"), None, None, None, None)
        .await
        .expect("start");

    let ended = registry.end(EndReason::Completed).await.expect("end");
    assert_eq!(ended.id, session.id);
    assert_eq!(ended.status, SessionStatus::Completed);
    assert!(ended.ended_at.is_some());

    registry
        .start(PathBuf::from("/proj"), None, None, None, None)
        .await
        .expect("start again after end");
}

#[tokio::test]
async fn idle_timeout_auto_cancels() {
    let (registry, _dir) = fresh_registry(Duration::from_millis(40)).await;
    let session = registry
        .start(PathBuf::from("/proj"), None, None, None, None)
        .await
        .expect("start");

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(registry.active_session().is_none());
    let stored = registry
        .action_log
        .get_session(session.id)
        .await
        .expect("get session");
    assert_eq!(stored.status, SessionStatus::Cancelled);
}

#[tokio::test]
async fn touch_resets_the_idle_clock() {
    let (registry, _dir) = fresh_registry(Duration::from_millis(80)).await;
    let session = registry
        .start(PathBuf::from("/proj"), None, None, None, None)
        .await
        .expect("start");

    tokio::time::sleep(Duration::from_millis(50)).await;
    registry.touch(session.id);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(registry.active_session().is_some());
}

#[tokio::test]
async fn restore_reconnects_an_active_session() {
    let (registry, _dir) = fresh_registry(Duration::from_secs(900)).await;
    let session = registry
        .start(PathBuf::from("/proj"), None, None, None, None)
        .await
        .expect("start");

    let restored = registry.restore(session.id).await.expect("restore");
    assert_eq!(restored.id, session.id);
}

#[tokio::test]
async fn restore_rejects_unknown_session() {
    let (registry, _dir) = fresh_registry(Duration::from_secs(900)).await;
    let err = registry.restore(999).await.expect_err("should fail");
    assert!(matches!(err, PaigeError::UnknownSession { session_id } if session_id == 999));
}
