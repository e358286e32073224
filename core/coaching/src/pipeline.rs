//! Wires the four coaching stages (spec §4.9) to the shared
//! collaborators: action log, memory store, model client, and the UI
//! broadcast channel.

use std::path::Path;
use std::sync::Arc;

use paige_action_log::ActionEvent;
use paige_action_log::ActionLogStore;
use paige_error::PaigeError;
use paige_memory_store::MemoryStore;
use paige_model_client::ModelClient;
use paige_protocol::ActionType;
use paige_protocol::CoachingMessage;
use paige_protocol::Phase;
use paige_protocol::Plan;
use paige_protocol::ReviewResult;
use paige_protocol::ServerMessage;
use paige_review_agent::ReviewAgentInput;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::coach;
use crate::plan;
use crate::reflect;
use crate::review;

/// Owns the collaborators every coaching stage needs and starts the
/// Reflect stage's background subscriber on construction.
pub struct CoachingPipeline {
    action_log: Arc<ActionLogStore>,
    memory_store: Arc<dyn MemoryStore>,
    model_client: Arc<dyn ModelClient>,
    broadcast_tx: broadcast::Sender<ServerMessage>,
    reflect_task: JoinHandle<()>,
}

impl CoachingPipeline {
    pub fn new(
        action_log: Arc<ActionLogStore>,
        memory_store: Arc<dyn MemoryStore>,
        model_client: Arc<dyn ModelClient>,
        broadcast_tx: broadcast::Sender<ServerMessage>,
    ) -> Self {
        let reflect_task = reflect::start(
            action_log.clone(),
            memory_store.clone(),
            model_client.clone(),
        );
        Self {
            action_log,
            memory_store,
            model_client,
            broadcast_tx,
            reflect_task,
        }
    }

    /// Runs the Plan stage. Subscribes a one-shot cancellation for
    /// `session_id`'s `session_ended` action so the stage aborts
    /// best-effort if the session ends before planning finishes (spec
    /// §5).
    pub async fn plan(
        &self,
        issue_title: &str,
        issue_summary: &str,
        project_dir: &Path,
        session_id: u64,
    ) -> Result<Plan, PaigeError> {
        let cancel = CancellationToken::new();
        let cancel_on_end = cancel.clone();
        self.action_log.events().subscribe(move |event: &ActionEvent| {
            if event.session_id == session_id && event.action_type == ActionType::SessionEnded {
                cancel_on_end.cancel();
            }
        });

        plan::run(
            issue_title,
            issue_summary,
            project_dir,
            self.model_client.as_ref(),
            &self.action_log,
            &self.broadcast_tx,
            session_id,
            &cancel,
        )
        .await
    }

    pub async fn coach(&self, phase: &Phase, session_id: u64) -> Result<CoachingMessage, PaigeError> {
        let message = coach::run(
            phase,
            self.memory_store.as_ref(),
            self.model_client.as_ref(),
            &self.action_log,
            session_id,
        )
        .await?;
        let _ = self
            .broadcast_tx
            .send(ServerMessage::CoachingMessage(message.clone()));
        Ok(message)
    }

    pub async fn review(
        &self,
        input: ReviewAgentInput,
        session_id: u64,
    ) -> Result<ReviewResult, PaigeError> {
        review::run(
            input,
            self.model_client.as_ref(),
            &self.action_log,
            &self.broadcast_tx,
            session_id,
        )
        .await
    }

    /// Aborts the Reflect stage's background subscriber task. Intended
    /// for process shutdown only — per-session teardown happens through
    /// the `session:ended` event, not this method.
    pub fn shutdown(&self) {
        self.reflect_task.abort();
    }
}

#[cfg(test)]
#[path = "pipeline.test.rs"]
mod tests;
