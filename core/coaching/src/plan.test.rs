use async_trait::async_trait;
use paige_model_client::RawModelResponse;
use paige_model_client::ToolUseBlock;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::*;

struct ImmediatePlanClient;

#[async_trait]
impl ModelClient for ImmediatePlanClient {
    async fn raw_call(&self, _opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        Ok(RawModelResponse {
            stop_reason: StopReason::EndTurn,
            text: Some(
                r#"{"title": "Fix bug", "summary": "s", "phases": [
                    {"number": 1, "title": "Understand", "status": "pending"}
                ]}"#
                .to_string(),
            ),
            tool_uses: Vec::new(),
            input_tokens: 10,
            output_tokens: 20,
        })
    }
}

struct AlwaysExploreClient;

#[async_trait]
impl ModelClient for AlwaysExploreClient {
    async fn raw_call(&self, _opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        Ok(RawModelResponse {
            stop_reason: StopReason::EndTurn,
            text: None,
            tool_uses: vec![ToolUseBlock {
                call_id: "c1".to_string(),
                name: "list_files".to_string(),
                arguments: serde_json::json!({}),
            }],
            input_tokens: 1,
            output_tokens: 1,
        })
    }
}

#[tokio::test]
async fn plan_broadcasts_started_and_complete() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let (tx, mut rx) = broadcast::channel(32);
    let client = ImmediatePlanClient;
    let cancel = CancellationToken::new();

    let plan = run(
        "Fix bug",
        "details",
        dir.path(),
        &client,
        &action_log,
        &tx,
        1,
        &cancel,
    )
    .await
    .expect("ok");
    assert_eq!(plan.title, "Fix bug");
    assert_eq!(plan.phases.len(), 1);

    let mut saw_started = false;
    let mut saw_complete = false;
    while let Ok(msg) = rx.try_recv() {
        match msg {
            ServerMessage::PlanningStarted(_) => saw_started = true,
            ServerMessage::PlanningComplete(_) => saw_complete = true,
            _ => {}
        }
    }
    assert!(saw_started);
    assert!(saw_complete);
}

#[tokio::test]
async fn plan_exceeding_explore_turns_raises_max_turns_exceeded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let (tx, _rx) = broadcast::channel(64);
    let client = AlwaysExploreClient;
    let cancel = CancellationToken::new();

    let err = run(
        "Fix bug",
        "details",
        dir.path(),
        &client,
        &action_log,
        &tx,
        1,
        &cancel,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PaigeError::MaxTurnsExceeded { .. }));
}

#[tokio::test]
async fn plan_aborts_when_cancelled_before_first_turn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let (tx, mut rx) = broadcast::channel(32);
    let client = AlwaysExploreClient;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = run(
        "Fix bug",
        "details",
        dir.path(),
        &client,
        &action_log,
        &tx,
        1,
        &cancel,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PaigeError::SessionCancelled));

    let mut saw_session_ended_reason = false;
    while let Ok(msg) = rx.try_recv() {
        if let ServerMessage::PlanningError(e) = msg {
            saw_session_ended_reason = e.reason == "session_ended";
        }
    }
    assert!(saw_session_ended_reason);
}
