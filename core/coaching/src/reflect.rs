//! Reflect stage (spec §4.9): on session end, summarizes the session
//! into at most [`MAX_MEMORIES`] memory items and persists them via the
//! memory store.
//!
//! Mirrors the Observer's subscribe-then-spawn pattern (see
//! `paige_observer::ObserverHandle::start`): the event bus invokes
//! subscribers synchronously, so the handler here only forwards the
//! event onto a channel an owning task drains, keeping the actual model
//! call and memory-store write off the publisher's call stack.

use std::sync::Arc;

use paige_action_log::ActionEvent;
use paige_action_log::ActionLogStore;
use paige_error::PaigeError;
use paige_memory_store::ImportanceTier;
use paige_memory_store::MemoryInput;
use paige_memory_store::MemoryStore;
use paige_model_client::CallOptions;
use paige_model_client::ModelClient;
use paige_model_client::ModelTier;
use paige_model_client::call;
use paige_protocol::ActionType;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The Reflect stage never persists more than this many memory items
/// per session (spec §4.9).
const MAX_MEMORIES: usize = 8;

const SYSTEM_PROMPT: &str = "You are summarizing a coaching session into reusable memories \
for future sessions. Reply with JSON matching {memories: [{content, importance, tags}]} \
where importance is one of low|medium|high and there are at most 8 items.";

#[derive(Debug, Deserialize)]
struct ReflectedMemory {
    content: String,
    importance: ImportanceTier,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReflectionOutput {
    memories: Vec<ReflectedMemory>,
}

/// Subscribes to the action log's event bus and spawns the task that
/// owns reflection. Dropping the returned [`JoinHandle`] does not stop
/// the task; callers hold it only to observe/await shutdown.
pub fn start(
    action_log: Arc<ActionLogStore>,
    memory_store: Arc<dyn MemoryStore>,
    model_client: Arc<dyn ModelClient>,
) -> JoinHandle<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ActionEvent>();

    action_log.events().subscribe(move |event: &ActionEvent| {
        if event.action_type == ActionType::SessionEnded {
            let _ = tx.send(event.clone());
        }
    });

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(err) = reflect_session(
                event.session_id,
                &action_log,
                memory_store.as_ref(),
                model_client.as_ref(),
            )
            .await
            {
                tracing::warn!(session_id = event.session_id, %err, "reflect stage failed");
            }
        }
    })
}

async fn reflect_session(
    session_id: u64,
    action_log: &ActionLogStore,
    memory_store: &dyn MemoryStore,
    model_client: &dyn ModelClient,
) -> Result<(), PaigeError> {
    let session = action_log.get_session(session_id).await?;
    let actions = action_log.actions_by_session(session_id).await?;

    let transcript = actions
        .iter()
        .map(|a| format!("{:?} at {}", a.action_type, a.occurred_at))
        .collect::<Vec<_>>()
        .join("\n");

    let opts = CallOptions::new(
        "reflect_agent",
        ModelTier::Haiku,
        SYSTEM_PROMPT,
        format!("Session for {}:\n{transcript}", session.project_dir.display()),
        session_id,
    );

    let output: ReflectionOutput = call(model_client, action_log, opts).await?;
    let project = session.project_dir.display().to_string();

    let items: Vec<MemoryInput> = output
        .memories
        .into_iter()
        .take(MAX_MEMORIES)
        .map(|m| MemoryInput::new(m.content, m.tags, m.importance))
        .collect();

    if items.is_empty() {
        return Ok(());
    }

    memory_store.add_memories(items, session_id, &project).await?;
    Ok(())
}

#[cfg(test)]
#[path = "reflect.test.rs"]
mod tests;
