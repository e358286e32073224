use std::time::Duration;

use async_trait::async_trait;
use paige_memory_store::InMemoryMemoryStore;
use paige_model_client::RawModelResponse;
use paige_model_client::StopReason;
use paige_session::EndReason;
use paige_session::SessionRegistry;
use tokio::sync::broadcast;

use super::*;

struct ReflectionClient;

#[async_trait]
impl ModelClient for ReflectionClient {
    async fn raw_call(&self, _opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        Ok(RawModelResponse {
            stop_reason: StopReason::EndTurn,
            text: Some(
                r#"{"memories": [{"content": "Prefers small commits", "importance": "medium", "tags": ["style"]}]}"#
                    .to_string(),
            ),
            tool_uses: Vec::new(),
            input_tokens: 5,
            output_tokens: 5,
        })
    }
}

#[tokio::test]
async fn session_ended_event_triggers_memory_persistence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = Arc::new(ActionLogStore::open(dir.path()).expect("open"));
    let (broadcast_tx, _rx) = broadcast::channel(8);
    let session_registry =
        SessionRegistry::new(action_log.clone(), broadcast_tx, Duration::from_secs(3600));
    let memory_store: Arc<dyn MemoryStore> = Arc::new(InMemoryMemoryStore::new());
    let model_client: Arc<dyn ModelClient> = Arc::new(ReflectionClient);

    let _reflect_task = start(action_log.clone(), memory_store.clone(), model_client.clone());

    session_registry
        .start(dir.path().to_path_buf(), None, None, None, None)
        .await
        .expect("starts");
    session_registry.end(EndReason::Completed).await.expect("ends");

    // The reflect task runs asynchronously off the publish call; give it
    // a turn to drain its channel and complete the model call.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let hits = memory_store.query("small commits", 5, None).await.expect("query");
    assert_eq!(hits.len(), 1);
}
