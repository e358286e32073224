use async_trait::async_trait;
use paige_model_client::RawModelResponse;
use paige_model_client::StopReason;
use paige_review_agent::ReviewScope;
use tokio::sync::broadcast;

use super::*;

struct ApprovedClient;

#[async_trait]
impl ModelClient for ApprovedClient {
    async fn raw_call(&self, _opts: &paige_model_client::CallOptions) -> Result<RawModelResponse, PaigeError> {
        Ok(RawModelResponse {
            stop_reason: StopReason::EndTurn,
            text: Some(r#"{"approved": true, "summary": "good", "findings": []}"#.to_string()),
            tool_uses: Vec::new(),
            input_tokens: 1,
            output_tokens: 1,
        })
    }
}

#[tokio::test]
async fn review_broadcasts_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = ActionLogStore::open(dir.path()).expect("open");
    let (tx, mut rx) = broadcast::channel(8);
    let client = ApprovedClient;
    let input = ReviewAgentInput {
        scope: ReviewScope::CurrentFile,
        project_dir: dir.path().to_path_buf(),
        phase_title: None,
        active_file_path: None,
        open_file_paths: None,
        tasks: None,
    };

    let result = run(input, &client, &action_log, &tx, 1).await.expect("ok");
    assert!(result.approved);
    assert!(matches!(
        rx.try_recv().expect("message"),
        ServerMessage::CoachingReviewResult(_)
    ));
}
