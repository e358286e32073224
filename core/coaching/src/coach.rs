//! Coach stage (spec §4.9): turns a plan phase plus retrieved memories
//! into a coaching message for the learner.

use paige_action_log::ActionLogStore;
use paige_error::PaigeError;
use paige_memory_store::MemoryStore;
use paige_model_client::CallOptions;
use paige_model_client::ModelClient;
use paige_model_client::ModelTier;
use paige_model_client::call;
use paige_protocol::CoachingMessage;
use paige_protocol::NudgeTrigger;
use paige_protocol::Phase;
use serde::Deserialize;

const SYSTEM_PROMPT: &str = "You are coaching a developer working through a plan phase. \
Given the phase and relevant past-session memories, reply with JSON matching \
{title, body} giving one piece of guidance appropriate to the phase.";

#[derive(Debug, Deserialize)]
struct CoachGuidance {
    title: String,
    body: String,
}

/// Produces a [`CoachingMessage`] for `phase`, grounded in up to 5
/// memories retrieved for the phase's title.
pub async fn run(
    phase: &Phase,
    memory_store: &dyn MemoryStore,
    model_client: &dyn ModelClient,
    action_log: &ActionLogStore,
    session_id: u64,
) -> Result<CoachingMessage, PaigeError> {
    let memories = memory_store.query(&phase.title, 5, None).await?;
    let memory_text = memories
        .iter()
        .map(|m| format!("- {}", m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let user_message = format!(
        "Phase {}: {}\nSummary: {}\nRelevant memories:\n{}",
        phase.number,
        phase.title,
        phase.summary.clone().unwrap_or_default(),
        if memory_text.is_empty() {
            "(none)".to_string()
        } else {
            memory_text
        }
    );

    let opts = CallOptions::new(
        "coach_agent",
        ModelTier::Haiku,
        SYSTEM_PROMPT,
        user_message,
        session_id,
    );
    let guidance: CoachGuidance = call(model_client, action_log, opts).await?;

    Ok(CoachingMessage {
        id: 0,
        session_id,
        trigger: NudgeTrigger::Manual,
        confidence: 1.0,
        title: guidance.title,
        body: guidance.body,
        delivered_at: chrono::Utc::now(),
    })
}

#[cfg(test)]
#[path = "coach.test.rs"]
mod tests;
