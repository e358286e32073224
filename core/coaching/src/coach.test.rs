use async_trait::async_trait;
use paige_memory_store::InMemoryMemoryStore;
use paige_model_client::NoopModelClient;
use paige_model_client::RawModelResponse;
use paige_model_client::StopReason;

use super::*;

struct GuidanceClient;

#[async_trait]
impl ModelClient for GuidanceClient {
    async fn raw_call(&self, _opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        Ok(RawModelResponse {
            stop_reason: StopReason::EndTurn,
            text: Some(r#"{"title": "Extract helper", "body": "This function does two things."}"#.to_string()),
            tool_uses: Vec::new(),
            input_tokens: 5,
            output_tokens: 5,
        })
    }
}

#[tokio::test]
async fn coach_produces_coaching_message_from_model_response() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let memory_store = InMemoryMemoryStore::new();
    let client = GuidanceClient;
    let phase = Phase::new(1, "Understand");

    let msg = run(&phase, &memory_store, &client, &action_log, 1)
        .await
        .expect("ok");
    assert_eq!(msg.title, "Extract helper");
    assert_eq!(msg.trigger, NudgeTrigger::Manual);
}

#[tokio::test]
async fn coach_errors_on_noop_client_empty_response() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let memory_store = InMemoryMemoryStore::new();
    let client = NoopModelClient;
    let phase = Phase::new(1, "Understand");

    let err = run(&phase, &memory_store, &client, &action_log, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PaigeError::ModelSchema { .. }));
}
