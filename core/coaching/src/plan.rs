//! Plan stage (spec §4.9): explores the workspace with the same
//! read-only tool set the Review Agent uses, then produces a [`Plan`].
//!
//! Broadcasts the `planning:started → planning:progress* →
//! planning:phase_update* → planning:complete | planning:error`
//! sequence spec §4.9 requires.

use std::path::Path;
use std::time::Instant;

use paige_action_log::ActionLogStore;
use paige_error::PaigeError;
use paige_model_client::CallOptions;
use paige_model_client::ModelClient;
use paige_model_client::ModelTier;
use paige_model_client::StopReason;
use paige_model_client::compute_cost;
use paige_model_client::strip_markdown_fence;
use paige_protocol::Plan;
use paige_protocol::PlanningError;
use paige_protocol::PlanningProgress;
use paige_protocol::ServerMessage;
use paige_review_agent::tools;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Exploration turns are generous but bounded; unlike the Review
/// Agent's 20-turn hard limit (spec §4.10), no exact ceiling is named
/// for planning, so this is a conservative local choice.
const MAX_EXPLORE_TURNS: u32 = 10;

const SYSTEM_PROMPT: &str = "You are planning a coding session for an issue. You may call \
read_file, git_diff, and list_files to explore the project. When ready, reply with JSON \
matching {title, summary, phases:[{number, title, status, summary}]} and no tool calls.";

/// Runs the Plan stage for `issue_title`/`issue_summary`, broadcasting
/// progress and returning the resulting [`Plan`]. `cancel` is tripped
/// when the owning session ends (spec §5: best-effort cancellation of
/// in-flight coaching pipeline stages); once tripped, the next model
/// call this stage is waiting on aborts the run.
pub async fn run(
    issue_title: &str,
    issue_summary: &str,
    project_dir: &Path,
    client: &dyn ModelClient,
    action_log: &ActionLogStore,
    broadcast_tx: &broadcast::Sender<ServerMessage>,
    session_id: u64,
    cancel: &CancellationToken,
) -> Result<Plan, PaigeError> {
    let _ = broadcast_tx.send(ServerMessage::PlanningStarted(serde_json::json!({
        "issue_title": issue_title,
    })));
    progress(broadcast_tx, "fetching", 0, "Reading issue details");

    let mut transcript = format!(
        "Issue: {issue_title}\nSummary: {issue_summary}\nProject: {}\n",
        project_dir.display()
    );
    let tool_defs = tools::tool_definitions();
    progress(broadcast_tx, "exploring", 10, "Exploring the workspace");

    for turn in 1..=MAX_EXPLORE_TURNS {
        if cancel.is_cancelled() {
            let err = PaigeError::SessionCancelled;
            broadcast_error(broadcast_tx, &err);
            return Err(err);
        }

        let opts = CallOptions::new(
            "plan_agent",
            ModelTier::Sonnet,
            SYSTEM_PROMPT,
            transcript.clone(),
            session_id,
        )
        .with_tools(tool_defs.clone());

        let start = Instant::now();
        let call_result = tokio::select! {
            res = client.raw_call(&opts) => res,
            _ = cancel.cancelled() => {
                let err = PaigeError::SessionCancelled;
                broadcast_error(broadcast_tx, &err);
                return Err(err);
            }
        };
        let latency_ms = start.elapsed().as_millis() as i64;

        let response = match call_result {
            Ok(response) => {
                let cost = compute_cost(opts.model, response.input_tokens, response.output_tokens);
                let _ = action_log
                    .log_api_call(
                        session_id,
                        "plan_agent".to_string(),
                        ModelTier::Sonnet.as_str().to_string(),
                        response.input_tokens,
                        response.output_tokens,
                        cost,
                        latency_ms,
                        true,
                    )
                    .await;
                response
            }
            Err(err) => {
                broadcast_error(broadcast_tx, &err);
                return Err(err);
            }
        };

        if response.stop_reason == StopReason::Refusal {
            let err = PaigeError::ModelRefusal;
            broadcast_error(broadcast_tx, &err);
            return Err(err);
        }
        if response.stop_reason == StopReason::MaxTokens {
            let err = PaigeError::ModelMaxTokens;
            broadcast_error(broadcast_tx, &err);
            return Err(err);
        }

        if response.tool_uses.is_empty() {
            let text = response.text.unwrap_or_default();
            let cleaned = strip_markdown_fence(&text);
            progress(broadcast_tx, "writing_hints", 90, "Writing phase hints");

            let plan: Plan = match serde_json::from_str(cleaned) {
                Ok(plan) => plan,
                Err(e) => {
                    let err = PaigeError::ModelSchema {
                        message: format!("plan response did not match schema: {e}"),
                    };
                    broadcast_error(broadcast_tx, &err);
                    return Err(err);
                }
            };

            for phase in &plan.phases {
                let _ = broadcast_tx.send(ServerMessage::PlanningPhaseUpdate(phase.clone()));
            }
            let _ = broadcast_tx.send(ServerMessage::PlanningComplete(serde_json::json!({
                "title": plan.title,
            })));
            return Ok(plan);
        }

        tracing::debug!(turn, tool_count = response.tool_uses.len(), "plan agent exploring");
        for tool_use in response.tool_uses {
            let result = tools::execute(&tool_use.name, &tool_use.arguments, project_dir).await;
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

    let err = PaigeError::MaxTurnsExceeded {
        what: "Plan agent".to_string(),
    };
    broadcast_error(broadcast_tx, &err);
    Err(err)
}

fn progress(broadcast_tx: &broadcast::Sender<ServerMessage>, stage: &str, progress: u8, message: &str) {
    let _ = broadcast_tx.send(ServerMessage::PlanningProgress(PlanningProgress {
        stage: stage.to_string(),
        progress,
        message: message.to_string(),
    }));
}

fn broadcast_error(broadcast_tx: &broadcast::Sender<ServerMessage>, err: &PaigeError) {
    let reason = if matches!(err, PaigeError::SessionCancelled) {
        "session_ended".to_string()
    } else {
        err.ui_error_kind().to_string()
    };
    let _ = broadcast_tx.send(ServerMessage::PlanningError(PlanningError {
        reason,
        message: err.to_string(),
    }));
}

#[cfg(test)]
#[path = "plan.test.rs"]
mod tests;
