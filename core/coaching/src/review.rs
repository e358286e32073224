//! Review stage (spec §4.9): runs the Review Agent on request and
//! broadcasts its verdict as `coaching:review_result`.

use paige_action_log::ActionLogStore;
use paige_error::PaigeError;
use paige_model_client::ModelClient;
use paige_protocol::ReviewResult;
use paige_protocol::ServerMessage;
use paige_review_agent::ReviewAgentInput;
use tokio::sync::broadcast;

/// Runs the Review Agent for `input` and broadcasts the resulting
/// [`ReviewResult`] before returning it.
pub async fn run(
    input: ReviewAgentInput,
    client: &dyn ModelClient,
    action_log: &ActionLogStore,
    broadcast_tx: &broadcast::Sender<ServerMessage>,
    session_id: u64,
) -> Result<ReviewResult, PaigeError> {
    let result = paige_review_agent::run(input, client, action_log, session_id).await?;
    let _ = broadcast_tx.send(ServerMessage::CoachingReviewResult(result.clone()));
    Ok(result)
}

#[cfg(test)]
#[path = "review.test.rs"]
mod tests;
