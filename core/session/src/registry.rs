//! Session lifecycle registry (spec §4.6): enforces "at most one active
//! session per process", drives the idle auto-timeout, and broadcasts
//! `session:start|restore|end` on the shared UI message bus.
//!
//! Stopping the Observer, draining pending coaching pipelines, and
//! writing reflection memories (also named in spec §4.6) are not driven
//! directly from here: this registry only owns the session state
//! transition itself. It logs `session_ended` through the action log,
//! whose event bus the Observer and Coaching Pipeline subscribe to so
//! each can react to (and tear down) its own per-session state. This
//! keeps the "single owner of termination" property from spec §9
//! without making this crate depend on either of theirs.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use paige_action_log::ActionLogStore;
use paige_error::PaigeError;
use paige_protocol::ActionType;
use paige_protocol::ServerMessage;
use paige_protocol::Session;
use paige_protocol::SessionStatus;

/// Why a session ended, carried only in the action log (the broadcast
/// `session:end` payload is the `Session` itself, whose `status` field
/// already encodes this).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Completed,
    Cancelled,
    Errored,
}

impl EndReason {
    fn status(self) -> SessionStatus {
        match self {
            Self::Completed => SessionStatus::Completed,
            Self::Cancelled => SessionStatus::Cancelled,
            Self::Errored => SessionStatus::Errored,
        }
    }

    fn wire_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Errored => "error",
        }
    }
}

struct ActiveHandle {
    session: Session,
    last_activity: Arc<Mutex<Instant>>,
    idle_task: JoinHandle<()>,
}

/// Single-owner registry for the process's at-most-one active session.
pub struct SessionRegistry {
    action_log: Arc<ActionLogStore>,
    broadcast_tx: broadcast::Sender<ServerMessage>,
    next_id: AtomicU64,
    active: Mutex<Option<ActiveHandle>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(
        action_log: Arc<ActionLogStore>,
        broadcast_tx: broadcast::Sender<ServerMessage>,
        idle_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            action_log,
            broadcast_tx,
            next_id: AtomicU64::new(1),
            active: Mutex::new(None),
            idle_timeout,
        })
    }

    /// Starts a new session. Fails with `SessionAlreadyActive` if one is
    /// already tracked in this process.
    #[allow(clippy::too_many_arguments)]
    pub async fn start(
        self: &Arc<Self>,
        project_dir: PathBuf,
        issue_number: Option<u64>,
        issue_title: Option<String>,
        branch_name: Option<String>,
        stash_name: Option<String>,
    ) -> Result<Session, PaigeError> {
        {
            let guard = self.lock_active();
            if guard.is_some() {
                return Err(PaigeError::SessionAlreadyActive);
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut session = Session::new(id, project_dir);
        session.issue_number = issue_number;
        session.issue_title = issue_title;
        session.branch_name = branch_name;
        session.stash_name = stash_name;

        self.action_log.insert_session(session.clone()).await?;
        self.action_log
            .log_action(id, ActionType::SessionStarted, None)
            .await?;

        self.install_active(session.clone());
        self.broadcast(ServerMessage::SessionStart(session.clone()));
        Ok(session)
    }

    /// Re-establishes in-process tracking for a session already marked
    /// `Active` in storage (e.g. a UI reconnect, or recovery after a
    /// process restart) and publishes `session:restore`.
    pub async fn restore(self: &Arc<Self>, session_id: u64) -> Result<Session, PaigeError> {
        if let Some(session) = self.touch_if_matches(session_id) {
            self.broadcast(ServerMessage::SessionRestore(session.clone()));
            return Ok(session);
        }

        {
            let guard = self.lock_active();
            if guard.is_some() {
                return Err(PaigeError::SessionAlreadyActive);
            }
        }

        let session = self.action_log.get_session(session_id).await?;
        if session.status != SessionStatus::Active {
            return Err(PaigeError::UnknownSession { session_id });
        }

        self.install_active(session.clone());
        self.broadcast(ServerMessage::SessionRestore(session.clone()));
        Ok(session)
    }

    /// Ends the currently active session. Fails with `NoActiveSession`
    /// if none is tracked.
    pub async fn end(self: &Arc<Self>, reason: EndReason) -> Result<Session, PaigeError> {
        let handle = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or(PaigeError::NoActiveSession)?;

        handle.idle_task.abort();

        let ended_at = Utc::now();
        let mut session = handle.session;
        session.status = reason.status();
        session.ended_at = Some(ended_at);

        self.action_log
            .update_session_status(session.id, session.status, session.ended_at)
            .await?;
        self.action_log
            .log_action(
                session.id,
                ActionType::SessionEnded,
                Some(json!({ "reason": reason.wire_str() })),
            )
            .await?;

        self.broadcast(ServerMessage::SessionEnd(session.clone()));
        Ok(session)
    }

    /// Resets the idle timer for the active session, if its id matches.
    /// Called by every user-initiated action the registry's consumers
    /// observe (buffer updates, tool calls, explain requests, ...).
    pub fn touch(&self, session_id: u64) {
        let _ = self.touch_if_matches(session_id);
    }

    /// The currently active session, if any.
    pub fn active_session(&self) -> Option<Session> {
        self.lock_active().as_ref().map(|h| h.session.clone())
    }

    fn touch_if_matches(&self, session_id: u64) -> Option<Session> {
        let guard = self.lock_active();
        let handle = guard.as_ref()?;
        if handle.session.id != session_id {
            return None;
        }
        let mut last = handle
            .last_activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Instant::now();
        Some(handle.session.clone())
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveHandle>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn install_active(self: &Arc<Self>, session: Session) {
        let last_activity = Arc::new(Mutex::new(Instant::now()));
        let idle_task = self.spawn_idle_timer(session.id, last_activity.clone());
        *self.lock_active() = Some(ActiveHandle {
            session,
            last_activity,
            idle_task,
        });
    }

    fn spawn_idle_timer(
        self: &Arc<Self>,
        session_id: u64,
        last_activity: Arc<Mutex<Instant>>,
    ) -> JoinHandle<()> {
        let registry = self.clone();
        let idle_timeout = self.idle_timeout;
        let tick = (idle_timeout / 4).max(Duration::from_millis(10));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                let elapsed = {
                    let guard = last_activity
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    guard.elapsed()
                };
                if elapsed >= idle_timeout {
                    tracing::info!(session_id, "session idle timeout, auto-cancelling");
                    if let Err(err) = registry.end(EndReason::Cancelled).await {
                        tracing::warn!(session_id, %err, "idle auto-cancel failed");
                    }
                    break;
                }
            }
        })
    }

    fn broadcast(&self, message: ServerMessage) {
        // No subscribers yet (e.g. in tests) is not an error: the
        // broadcast channel's only failure mode is "no receivers".
        let _ = self.broadcast_tx.send(message);
    }
}

#[cfg(test)]
#[path = "registry.test.rs"]
mod tests;
