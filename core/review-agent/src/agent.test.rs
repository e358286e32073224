use std::sync::Mutex;

use async_trait::async_trait;
use paige_model_client::CallOptions;
use paige_model_client::RawModelResponse;
use paige_model_client::StopReason;
use paige_model_client::ToolUseBlock;

use super::*;
use crate::input::ReviewScope;

struct ImmediateResultClient;

#[async_trait]
impl ModelClient for ImmediateResultClient {
    async fn raw_call(&self, _opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        Ok(RawModelResponse {
            stop_reason: StopReason::EndTurn,
            text: Some(r#"{"approved": true, "summary": "looks good", "findings": []}"#.to_string()),
            tool_uses: Vec::new(),
            input_tokens: 10,
            output_tokens: 20,
        })
    }
}

struct UnparseableResultClient;

#[async_trait]
impl ModelClient for UnparseableResultClient {
    async fn raw_call(&self, _opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        Ok(RawModelResponse {
            stop_reason: StopReason::EndTurn,
            text: Some("not json at all".to_string()),
            tool_uses: Vec::new(),
            input_tokens: 10,
            output_tokens: 5,
        })
    }
}

struct OneToolCallThenResultClient {
    calls: Mutex<u32>,
}

#[async_trait]
impl ModelClient for OneToolCallThenResultClient {
    async fn raw_call(&self, _opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        *calls += 1;
        if *calls == 1 {
            Ok(RawModelResponse {
                stop_reason: StopReason::EndTurn,
                text: None,
                tool_uses: vec![ToolUseBlock {
                    call_id: "call_1".to_string(),
                    name: "list_files".to_string(),
                    arguments: serde_json::json!({}),
                }],
                input_tokens: 10,
                output_tokens: 5,
            })
        } else {
            Ok(RawModelResponse {
                stop_reason: StopReason::EndTurn,
                text: Some(r#"{"approved": false, "summary": "issues found", "findings": []}"#.to_string()),
                tool_uses: Vec::new(),
                input_tokens: 10,
                output_tokens: 5,
            })
        }
    }
}

struct AlwaysToolCallClient;

#[async_trait]
impl ModelClient for AlwaysToolCallClient {
    async fn raw_call(&self, _opts: &CallOptions) -> Result<RawModelResponse, PaigeError> {
        Ok(RawModelResponse {
            stop_reason: StopReason::EndTurn,
            text: None,
            tool_uses: vec![ToolUseBlock {
                call_id: "call_n".to_string(),
                name: "list_files".to_string(),
                arguments: serde_json::json!({}),
            }],
            input_tokens: 1,
            output_tokens: 1,
        })
    }
}

fn test_input(dir: &tempfile::TempDir) -> ReviewAgentInput {
    ReviewAgentInput {
        scope: ReviewScope::CurrentFile,
        project_dir: dir.path().to_path_buf(),
        phase_title: None,
        active_file_path: None,
        open_file_paths: None,
        tasks: None,
    }
}

#[tokio::test]
async fn text_only_response_parses_as_review_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let client = ImmediateResultClient;

    let result = run(test_input(&dir), &client, &action_log, 1)
        .await
        .expect("ok");
    assert!(result.approved);
    assert_eq!(result.summary, "looks good");
}

#[tokio::test]
async fn unparseable_response_falls_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let client = UnparseableResultClient;

    let result = run(test_input(&dir), &client, &action_log, 1)
        .await
        .expect("ok");
    assert!(!result.approved);
    assert!(result.summary.contains("could not be parsed"));
}

#[tokio::test]
async fn tool_call_then_result_completes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let client = OneToolCallThenResultClient {
        calls: Mutex::new(0),
    };

    let result = run(test_input(&dir), &client, &action_log, 1)
        .await
        .expect("ok");
    assert!(!result.approved);
    assert_eq!(result.summary, "issues found");
}

#[tokio::test]
async fn loop_exceeding_twenty_turns_raises_max_turns_exceeded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let client = AlwaysToolCallClient;

    let err = run(test_input(&dir), &client, &action_log, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PaigeError::MaxTurnsExceeded { .. }));
}
