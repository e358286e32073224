//! The Review Agent's bounded tool-use loop (spec §4.10, §8 scenario 5).

use std::time::Instant;

use paige_action_log::ActionLogStore;
use paige_error::PaigeError;
use paige_model_client::CallOptions;
use paige_model_client::ModelClient;
use paige_model_client::ModelTier;
use paige_model_client::RawModelResponse;
use paige_model_client::StopReason;
use paige_model_client::compute_cost;
use paige_model_client::strip_markdown_fence;
use paige_protocol::ReviewResult;

use crate::input::ReviewAgentInput;
use crate::tools;

/// A turn may run at most this many times before the loop is aborted
/// (spec §4.10, §8 scenario 5).
const MAX_TURNS: u32 = 20;

const SYSTEM_PROMPT: &str = "You are a code review agent. You may call read_file, \
git_diff, and list_files to inspect the project. When you are done, reply with a \
JSON object matching {approved, summary, findings} and no tool calls.";

/// Runs the Review Agent to completion, or raises `MaxTurnsExceeded` once
/// the loop exceeds [`MAX_TURNS`] turns.
pub async fn run(
    input: ReviewAgentInput,
    client: &dyn ModelClient,
    action_log: &ActionLogStore,
    session_id: u64,
) -> Result<ReviewResult, PaigeError> {
    let project_dir = input.project_dir.clone();
    let mut transcript = input.describe();
    let tool_defs = tools::tool_definitions();

    for turn in 1..=MAX_TURNS {
        let opts = CallOptions::new(
            "review_agent",
            ModelTier::Sonnet,
            SYSTEM_PROMPT,
            transcript.clone(),
            session_id,
        )
        .with_tools(tool_defs.clone());

        let start = Instant::now();
        let call_result = client.raw_call(&opts).await;
        let latency_ms = start.elapsed().as_millis() as i64;

        let response = match call_result {
            Ok(response) => {
                let cost = compute_cost(opts.model, response.input_tokens, response.output_tokens);
                log_turn(action_log, session_id, latency_ms, &response, cost).await?;
                response
            }
            Err(err) => {
                let _ = action_log
                    .log_api_call(session_id, "review_agent".to_string(), ModelTier::Sonnet.as_str().to_string(), 0, 0, 0.0, -1, false)
                    .await;
                return Err(err);
            }
        };

        match response.stop_reason {
            StopReason::Refusal => return Err(PaigeError::ModelRefusal),
            StopReason::MaxTokens => return Err(PaigeError::ModelMaxTokens),
            StopReason::EndTurn => {}
        }

        if response.tool_uses.is_empty() {
            let text = response.text.unwrap_or_default();
            let cleaned = strip_markdown_fence(&text);
            let result = serde_json::from_str(cleaned)
                .unwrap_or_else(|_| ReviewResult::unparseable_fallback(&text));
            return Ok(result);
        }

        tracing::debug!(turn, tool_count = response.tool_uses.len(), "review agent tool turn");
        for tool_use in response.tool_uses {
            let result = tools::execute(&tool_use.name, &tool_use.arguments, &project_dir).await;
            let payload = match result {
                Ok(value) => value,
                Err(err) => serde_json::json!({"error": err.to_string()}),
            };
            transcript.push_str(&format!(
                "\nTool result for {} ({}): {payload}\n",
                tool_use.name, tool_use.call_id
            ));
        }
    }

    Err(PaigeError::MaxTurnsExceeded {
        what: "Review agent".to_string(),
    })
}

async fn log_turn(
    action_log: &ActionLogStore,
    session_id: u64,
    latency_ms: i64,
    response: &RawModelResponse,
    cost: f64,
) -> Result<(), PaigeError> {
    action_log
        .log_api_call(
            session_id,
            "review_agent".to_string(),
            ModelTier::Sonnet.as_str().to_string(),
            response.input_tokens,
            response.output_tokens,
            cost,
            latency_ms,
            true,
        )
        .await
        .map(|_| ())
}

#[cfg(test)]
#[path = "agent.test.rs"]
mod tests;
