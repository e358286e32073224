use std::time::Duration;

use paige_model_client::NoopModelClient;
use paige_session::SessionRegistry;
use tokio::sync::broadcast;

use super::*;

#[tokio::test]
async fn session_started_then_ended_does_not_panic_the_manager_task() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = Arc::new(ActionLogStore::open(dir.path()).expect("open"));
    let (broadcast_tx, _rx) = broadcast::channel(8);
    let model_client: Arc<dyn ModelClient> = Arc::new(NoopModelClient);

    let manager_task = start(
        action_log.clone(),
        model_client,
        broadcast_tx.clone(),
        ObserverConfig::default(),
    );

    let session_registry = SessionRegistry::new(action_log.clone(), broadcast_tx, Duration::from_secs(3600));
    let session = session_registry
        .start(dir.path().to_path_buf(), None, None, None, None)
        .await
        .expect("starts");
    session_registry.end(paige_session::EndReason::Completed).await.expect("ends");

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!manager_task.is_finished());
    assert_eq!(session.project_dir, dir.path().to_path_buf());
}
