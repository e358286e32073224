//! Registers the inbound handlers that turn client→server UI messages
//! (spec §6) into calls against the core collaborators, and the
//! periodic buffer-summary timer (spec §4.2).
//!
//! Not every one of the 23 client message types drives process state:
//! pure editor-presence signals (`editor:cursor|scroll|selection`,
//! `terminal:*`, `hints:level_change`, `dashboard:*`, `repos:*`) have no
//! server-side collaborator in this system (they belong to the UI
//! renderer / dashboard data source / terminal PTY, all out of scope
//! per spec §1) — they are accepted and logged at debug level so an
//! unknown-type validation error is never raised for a message that is
//! genuinely part of the closed client→server set.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use paige_action_log::ActionLogStore;
use paige_buffer_cache::BufferCache;
use paige_coaching::CoachingPipeline;
use paige_error::PaigeError;
use paige_protocol::ActionType;
use paige_protocol::Buffer;
use paige_protocol::BufferUpdateRequest;
use paige_protocol::ExplainRequest;
use paige_protocol::ServerMessage;
use paige_protocol::error_message_for_kind;
use paige_session::SessionRegistry;
use paige_ui_hub::ClientId;
use paige_ui_hub::Hub;
use serde_json::Value;
use tokio::sync::broadcast;

/// Everything a handler closure needs; cloned cheaply (all `Arc`s) into
/// each registration.
#[derive(Clone)]
pub struct Wiring {
    pub project_dir: PathBuf,
    pub action_log: Arc<ActionLogStore>,
    pub session_registry: Arc<SessionRegistry>,
    pub buffer_cache: Arc<BufferCache>,
    pub coaching: Arc<CoachingPipeline>,
    pub broadcast_tx: broadcast::Sender<ServerMessage>,
}

impl Wiring {
    fn active_session_id(&self) -> Option<u64> {
        self.session_registry.active_session().map(|s| s.id)
    }

    fn broadcast(&self, message: ServerMessage) {
        let _ = self.broadcast_tx.send(message);
    }

    async fn report_error(&self, hub: &Hub, client_id: ClientId, err: &PaigeError) {
        hub.send_to(
            client_id,
            error_message_for_kind(err.ui_error_kind(), err.to_string(), None),
        )
        .await;
    }
}

/// Registers every handler this process drives UI messages through.
pub async fn register(hub: &Arc<Hub>, wiring: Wiring) {
    register_file_open(hub, wiring.clone()).await;
    register_file_close(hub, wiring.clone()).await;
    register_file_save(hub, wiring.clone()).await;
    register_buffer_update(hub, wiring.clone()).await;
    register_phase_expand_step(hub, wiring.clone()).await;
    register_user_explain(hub, wiring.clone()).await;
    register_user_review(hub, wiring.clone()).await;
    register_coaching_feedback(hub, wiring).await;
}

async fn register_file_open(hub: &Arc<Hub>, wiring: Wiring) {
    hub.on(
        "file:open",
        Arc::new(move |_client_id, payload: Value| {
            let wiring = wiring.clone();
            Box::pin(async move {
                let path = required_path(&payload)?;
                let resolved = paige_tools::validate_path(&path, &wiring.project_dir)?;
                let content = wiring
                    .buffer_cache
                    .get(&resolved)
                    .map(|b| b.content)
                    .or_else(|| std::fs::read_to_string(&resolved).ok())
                    .unwrap_or_default();
                let buffer = Buffer::new(resolved.clone(), content);
                wiring.broadcast(ServerMessage::BufferContent(buffer));
                if let Some(session_id) = wiring.active_session_id() {
                    wiring
                        .action_log
                        .log_action(
                            session_id,
                            ActionType::FileOpened,
                            Some(serde_json::json!({ "path": resolved })),
                        )
                        .await?;
                    wiring.session_registry.touch(session_id);
                }
                Ok(())
            })
        }),
    )
    .await;
}

async fn register_file_close(hub: &Arc<Hub>, wiring: Wiring) {
    hub.on(
        "file:close",
        Arc::new(move |_client_id, payload: Value| {
            let wiring = wiring.clone();
            Box::pin(async move {
                let path = required_path(&payload)?;
                let resolved = paige_tools::validate_path(&path, &wiring.project_dir)?;
                wiring.buffer_cache.clear(&resolved);
                Ok(())
            })
        }),
    )
    .await;
}

async fn register_file_save(hub: &Arc<Hub>, wiring: Wiring) {
    let hub_clone = hub.clone();
    hub.on(
        "file:save",
        Arc::new(move |client_id, payload: Value| {
            let hub = hub_clone.clone();
            let wiring = wiring.clone();
            Box::pin(async move {
                let path = required_path(&payload)?;
                let resolved = paige_tools::validate_path(&path, &wiring.project_dir)?;
                let content = wiring
                    .buffer_cache
                    .get(&resolved)
                    .map(|b| b.content)
                    .unwrap_or_default();
                if let Err(err) = std::fs::write(&resolved, &content) {
                    let paige_err = PaigeError::Storage {
                        message: err.to_string(),
                    };
                    wiring.report_error(&hub, client_id, &paige_err).await;
                    return Ok(());
                }
                hub.send_to(
                    client_id,
                    ServerMessage::SaveAck(serde_json::json!({ "path": resolved, "success": true })),
                )
                .await;
                Ok(())
            })
        }),
    )
    .await;
}

async fn register_buffer_update(hub: &Arc<Hub>, wiring: Wiring) {
    hub.on(
        "buffer:update",
        Arc::new(move |_client_id, payload: Value| {
            let wiring = wiring.clone();
            Box::pin(async move {
                let request: BufferUpdateRequest =
                    serde_json::from_value(payload).map_err(|err| PaigeError::Validation {
                        message: format!("invalid buffer:update payload: {err}"),
                    })?;
                let resolved = paige_tools::validate_path(&request.path, &wiring.project_dir)?;
                let outcome = wiring.buffer_cache.update(&resolved, request.content);

                if let Some(session_id) = wiring.active_session_id() {
                    if outcome.significance == paige_protocol::ChangeSignificance::Significant {
                        wiring
                            .action_log
                            .log_action(
                                session_id,
                                ActionType::BufferSignificantChange,
                                Some(outcome.significant_change_payload(&resolved)),
                            )
                            .await?;
                    }
                    wiring.session_registry.touch(session_id);
                }
                Ok(())
            })
        }),
    )
    .await;
}

/// A phase's steps have been expanded/completed client-side. Logs
/// `phase_completed`, which the Observer trigger table (spec §4.8)
/// treats as an every-occurrence trigger that also resets
/// `bufferUpdateCount`.
async fn register_phase_expand_step(hub: &Arc<Hub>, wiring: Wiring) {
    hub.on(
        "phase:expand_step",
        Arc::new(move |_client_id, payload: Value| {
            let wiring = wiring.clone();
            Box::pin(async move {
                if let Some(session_id) = wiring.active_session_id() {
                    wiring
                        .action_log
                        .log_action(session_id, ActionType::PhaseCompleted, Some(payload))
                        .await?;
                    wiring.session_registry.touch(session_id);
                }
                Ok(())
            })
        }),
    )
    .await;
}

async fn register_user_explain(hub: &Arc<Hub>, wiring: Wiring) {
    hub.on(
        "user:explain",
        Arc::new(move |_client_id, payload: Value| {
            let wiring = wiring.clone();
            Box::pin(async move {
                let request: ExplainRequest =
                    serde_json::from_value(payload).map_err(|err| PaigeError::Validation {
                        message: format!("invalid user:explain payload: {err}"),
                    })?;
                if let Some(session_id) = wiring.active_session_id() {
                    wiring
                        .action_log
                        .log_action(
                            session_id,
                            ActionType::ExplainRequested,
                            Some(serde_json::json!({
                                "question": request.question,
                                "path": request.path,
                            })),
                        )
                        .await?;
                }
                Ok(())
            })
        }),
    )
    .await;
}

async fn register_user_review(hub: &Arc<Hub>, wiring: Wiring) {
    let hub_clone = hub.clone();
    hub.on(
        "user:review",
        Arc::new(move |client_id, _payload: Value| {
            let hub = hub_clone.clone();
            let wiring = wiring.clone();
            Box::pin(async move {
                let Some(session_id) = wiring.active_session_id() else {
                    wiring
                        .report_error(&hub, client_id, &PaigeError::NoActiveSession)
                        .await;
                    return Ok(());
                };
                let open_files = wiring.buffer_cache.dirty_paths();
                let input = paige_review_agent::ReviewAgentInput {
                    scope: paige_review_agent::ReviewScope::OpenFiles,
                    project_dir: wiring.project_dir.clone(),
                    phase_title: None,
                    active_file_path: None,
                    open_file_paths: Some(open_files),
                    tasks: None,
                };
                if let Err(err) = wiring.coaching.review(input, session_id).await {
                    wiring.report_error(&hub, client_id, &err).await;
                }
                Ok(())
            })
        }),
    )
    .await;
}

async fn register_coaching_feedback(hub: &Arc<Hub>, wiring: Wiring) {
    hub.on(
        "coaching:feedback",
        Arc::new(move |_client_id, payload: Value| {
            let wiring = wiring.clone();
            Box::pin(async move {
                if let Some(session_id) = wiring.active_session_id() {
                    wiring
                        .action_log
                        .log_action(session_id, ActionType::NudgeDelivered, Some(payload))
                        .await?;
                }
                Ok(())
            })
        }),
    )
    .await;
}

fn required_path(payload: &Value) -> Result<String, PaigeError> {
    payload
        .get("path")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PaigeError::Validation {
            message: "payload missing required 'path' field".to_string(),
        })
}

/// Walks dirty buffer paths on `interval` and logs one `buffer_summary`
/// action per path, then resets its edit-count state (spec §4.2).
pub fn spawn_buffer_summary_timer(
    action_log: Arc<ActionLogStore>,
    buffer_cache: Arc<BufferCache>,
    session_registry: Arc<SessionRegistry>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let Some(session_id) = session_registry.active_session().map(|s| s.id) else {
                continue;
            };
            for summary in buffer_cache.drain_summaries() {
                let payload = serde_json::json!({
                    "kind": "buffer_summary",
                    "path": summary.path,
                    "editCount": summary.edit_count,
                    "charDelta": summary.char_delta,
                    "charCount": summary.char_count,
                });
                if let Err(err) = action_log
                    .log_action(session_id, ActionType::BufferSummary, Some(payload))
                    .await
                {
                    tracing::error!(%err, "failed to log buffer_summary");
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "ui_wiring.test.rs"]
mod tests;
