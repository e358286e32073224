//! The per-session Observer actor (spec §4.8, §9 "actor-style owner"):
//! a single task owns [`SessionObserverState`] and receives both action
//! events and external queries (mute, status) through one channel, so no
//! ad-hoc locking is needed around the counters or ring buffer.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use paige_action_log::ActionEvent;
use paige_action_log::ActionLogStore;
use paige_config::ObserverConfig;
use paige_protocol::ActionType;
use paige_protocol::CoachingMessage;
use paige_protocol::NudgeTrigger;
use paige_protocol::ServerMessage;

use crate::classifier::Classifier;
use crate::classifier::ClassifierContext;
use crate::classifier::TriageResult;
use crate::state::ObserverStatus;
use crate::state::SessionObserverState;
use crate::state::TriggerOutcome;
use crate::state::is_user_initiated;

enum Command {
    Event(ActionEvent),
    SetMuted(bool),
    Stop,
    Status(oneshot::Sender<ObserverStatus>),
    TriageDone(TriageResult, NudgeTrigger),
    TriageFailed(String),
}

/// Which trigger policy (spec §4.8 trigger table) caused this triage run,
/// carried through to the delivered nudge's `trigger` field.
fn nudge_trigger_for(action_type: ActionType) -> NudgeTrigger {
    match action_type {
        ActionType::ExplainRequested => NudgeTrigger::ExplainRequestThreshold,
        ActionType::BufferSignificantChange | ActionType::BufferSummary => {
            NudgeTrigger::BufferUpdateThreshold
        }
        _ => NudgeTrigger::Manual,
    }
}

/// Handle to a running per-session Observer actor. Cheap to clone; the
/// underlying task exits once [`ObserverHandle::stop`] is called.
#[derive(Clone)]
pub struct ObserverHandle {
    session_id: u64,
    cmd_tx: mpsc::UnboundedSender<Command>,
    stopped: Arc<AtomicBool>,
}

impl ObserverHandle {
    /// Starts a new per-session Observer: subscribes to the action log's
    /// event bus and spawns the owning task.
    pub fn start(
        session_id: u64,
        action_log: Arc<ActionLogStore>,
        classifier: Arc<dyn Classifier>,
        broadcast_tx: tokio::sync::broadcast::Sender<ServerMessage>,
        config: ObserverConfig,
    ) -> (Self, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let stopped = Arc::new(AtomicBool::new(false));

        let sub_tx = cmd_tx.clone();
        let sub_stopped = stopped.clone();
        action_log.events().subscribe(move |event: &ActionEvent| {
            if sub_stopped.load(Ordering::SeqCst) {
                return;
            }
            let _ = sub_tx.send(Command::Event(event.clone()));
        });

        let handle = Self {
            session_id,
            cmd_tx: cmd_tx.clone(),
            stopped: stopped.clone(),
        };

        let task = tokio::spawn(run_actor(
            session_id,
            cmd_rx,
            cmd_tx,
            action_log,
            classifier,
            broadcast_tx,
            config,
        ));

        (handle, task)
    }

    pub fn set_muted(&self, muted: bool) {
        let _ = self.cmd_tx.send(Command::SetMuted(muted));
    }

    /// Transitions to `Stopped`. A subsequent action event must not
    /// trigger triage (enforced both here and by the subscriber guard).
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _ = self.cmd_tx.send(Command::Stop);
    }

    pub async fn status(&self) -> Option<ObserverStatus> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx.send(Command::Status(tx)).ok()?;
        rx.await.ok()
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }
}

async fn run_actor(
    session_id: u64,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    action_log: Arc<ActionLogStore>,
    classifier: Arc<dyn Classifier>,
    broadcast_tx: tokio::sync::broadcast::Sender<ServerMessage>,
    config: ObserverConfig,
) {
    let mut state = SessionObserverState::new();
    state.status = ObserverStatus::Active;
    let cooldown = Duration::from_millis(config.cooldown_ms);
    let flow_window = Duration::from_millis(config.flow_state_window_ms);

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            Command::Stop => {
                state.status = ObserverStatus::Stopped;
                break;
            }
            Command::SetMuted(muted) => {
                state.status = if muted {
                    ObserverStatus::Muted
                } else {
                    ObserverStatus::Active
                };
            }
            Command::Status(reply) => {
                let _ = reply.send(state.status);
            }
            Command::TriageDone(result, trigger) => {
                handle_triage_result(
                    session_id,
                    &mut state,
                    &action_log,
                    &broadcast_tx,
                    config.confidence_threshold,
                    cooldown,
                    result,
                    trigger,
                )
                .await;
                state.triage_in_flight = false;
            }
            Command::TriageFailed(err) => {
                tracing::warn!(session_id, %err, "observer classifier call failed");
                state.triage_in_flight = false;
            }
            Command::Event(event) => {
                if event.session_id != session_id {
                    continue;
                }
                if state.status == ObserverStatus::Stopped {
                    continue;
                }

                let now = Instant::now();
                let outcome = state.apply_trigger_table(
                    event.action_type,
                    config.buffer_update_trigger_count,
                    config.explain_request_trigger_count,
                );

                let user_initiated = is_user_initiated(event.action_type);
                state.evict_stale_flow_entries(now, flow_window);
                if user_initiated {
                    state.push_flow_entry(now);
                }

                if outcome != TriggerOutcome::Triggered {
                    continue;
                }
                if state.status == ObserverStatus::Muted {
                    continue;
                }
                if state.flow_state_active(config.flow_state_threshold) {
                    continue;
                }
                if state.triage_in_flight {
                    continue;
                }

                state.triage_in_flight = true;
                let trigger = nudge_trigger_for(event.action_type);
                let ctx = ClassifierContext {
                    session_id,
                    trigger_action: format!("{:?}", event.action_type),
                    recent_action_types: Vec::new(),
                };
                let classifier = classifier.clone();
                let result_tx = cmd_tx.clone();
                tokio::spawn(async move {
                    let cmd = match classifier.classify(ctx).await {
                        Ok(result) => Command::TriageDone(result, trigger),
                        Err(err) => Command::TriageFailed(err.to_string()),
                    };
                    let _ = result_tx.send(cmd);
                });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_triage_result(
    session_id: u64,
    state: &mut SessionObserverState,
    action_log: &Arc<ActionLogStore>,
    broadcast_tx: &tokio::sync::broadcast::Sender<ServerMessage>,
    confidence_threshold: f64,
    cooldown: Duration,
    result: TriageResult,
    trigger: NudgeTrigger,
) {
    if let Err(err) = action_log
        .log_action(
            session_id,
            ActionType::ObserverTriage,
            Some(json!({
                "should_nudge": result.should_nudge,
                "confidence": result.confidence,
                "signal": result.signal,
                "reasoning": result.reasoning,
            })),
        )
        .await
    {
        tracing::error!(session_id, %err, "failed to log observer_triage");
    }

    if !result.should_nudge {
        return;
    }

    if result.confidence < confidence_threshold {
        log_suppression(action_log, session_id, "low_confidence").await;
        return;
    }

    let now = Instant::now();
    if state.in_cooldown(now, cooldown) {
        log_suppression(action_log, session_id, "cooldown").await;
        return;
    }

    let nudge = CoachingMessage {
        id: 0,
        session_id,
        trigger,
        confidence: result.confidence,
        title: result.signal.clone(),
        body: result
            .reasoning
            .clone()
            .unwrap_or_else(|| "Your coach has a suggestion.".to_string()),
        delivered_at: chrono::Utc::now(),
    };
    let _ = broadcast_tx.send(ServerMessage::ObserverNudge(nudge));

    if let Err(err) = action_log
        .log_action(
            session_id,
            ActionType::NudgeDelivered,
            Some(json!({ "signal": result.signal, "confidence": result.confidence })),
        )
        .await
    {
        tracing::error!(session_id, %err, "failed to log nudge_sent");
    }

    state.last_nudge_at = Some(now);
}

async fn log_suppression(action_log: &Arc<ActionLogStore>, session_id: u64, reason: &str) {
    if let Err(err) = action_log
        .log_action(
            session_id,
            ActionType::NudgeSuppressed,
            Some(json!({ "reason": reason })),
        )
        .await
    {
        tracing::error!(session_id, %err, "failed to log nudge_suppressed");
    }
}

#[cfg(test)]
#[path = "actor.test.rs"]
mod tests;
