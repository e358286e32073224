//! SQLite-backed action log and api-call log store.
//!
//! A single `Connection` guarded by a blocking `Mutex`; all queries run
//! through `spawn_blocking` so async callers never block the executor.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use chrono::DateTime;
use chrono::Utc;
use rusqlite::Connection;
use rusqlite::params;
use serde_json::Value;
use tokio::task::spawn_blocking;

use paige_error::PaigeError;
use paige_protocol::Action;
use paige_protocol::ActionType;
use paige_protocol::ApiCallLogEntry;
use paige_protocol::Session;
use paige_protocol::SessionStatus;

use crate::event_bus::ActionEvent;
use crate::event_bus::EventBus;
use crate::schema;

/// Owns the single SQLite file backing sessions, the action log and the
/// api-call cost log, plus the in-process event bus published to on
/// every [`ActionLogStore::log_action`] call.
pub struct ActionLogStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
    events: EventBus,
}

impl ActionLogStore {
    /// Opens (creating if necessary) `paige.db` under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, PaigeError> {
        std::fs::create_dir_all(data_dir).map_err(|e| PaigeError::Storage {
            message: format!("failed to create data dir {}: {e}", data_dir.display()),
        })?;
        let db_path = data_dir.join("paige.db");
        let conn = Connection::open(&db_path).map_err(|e| PaigeError::Storage {
            message: format!("failed to open {}: {e}", db_path.display()),
        })?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: db_path,
            events: EventBus::new(),
        })
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    async fn query<F, T>(&self, f: F) -> Result<T, PaigeError>
    where
        F: FnOnce(&Connection) -> Result<T, PaigeError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        let path = self.path.clone();
        spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| PaigeError::Storage {
                message: format!("{} connection mutex poisoned", path.display()),
            })?;
            f(&guard)
        })
        .await
        .map_err(|e| PaigeError::Storage {
            message: format!("blocking task failed: {e}"),
        })?
    }

    pub async fn insert_session(&self, session: Session) -> Result<(), PaigeError> {
        self.query(move |conn| {
            conn.execute(
                "INSERT INTO sessions
                    (id, project_dir, status, started_at, ended_at, issue_number, issue_title, branch_name, stash_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session.id as i64,
                    session.project_dir.to_string_lossy(),
                    status_str(session.status),
                    session.started_at.to_rfc3339(),
                    session.ended_at.map(|t| t.to_rfc3339()),
                    session.issue_number.map(|n| n as i64),
                    session.issue_title,
                    session.branch_name,
                    session.stash_name,
                ],
            )
            .map_err(|e| PaigeError::Storage {
                message: format!("insert session failed: {e}"),
            })?;
            Ok(())
        })
        .await
    }

    pub async fn update_session_status(
        &self,
        session_id: u64,
        status: SessionStatus,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<(), PaigeError> {
        self.query(move |conn| {
            conn.execute(
                "UPDATE sessions SET status = ?1, ended_at = ?2 WHERE id = ?3",
                params![
                    status_str(status),
                    ended_at.map(|t| t.to_rfc3339()),
                    session_id as i64
                ],
            )
            .map_err(|e| PaigeError::Storage {
                message: format!("update session status failed: {e}"),
            })?;
            Ok(())
        })
        .await
    }

    /// Inserts an action row and synchronously publishes it on the event
    /// bus, matching the "synchronously emits" wording in spec §4.3.
    pub async fn log_action(
        &self,
        session_id: u64,
        action_type: ActionType,
        data: Option<Value>,
    ) -> Result<Action, PaigeError> {
        let payload = data.clone().unwrap_or(Value::Null);
        let action = self
            .query(move |conn| {
                let now = Utc::now();
                let data_json = data.map(|v| v.to_string());
                conn.execute(
                    "INSERT INTO action_log (session_id, action_type, data_json, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        session_id as i64,
                        action_type_str(action_type),
                        data_json,
                        now.to_rfc3339()
                    ],
                )
                .map_err(|e| PaigeError::Storage {
                    message: format!("insert action failed: {e}"),
                })?;
                let id = conn.last_insert_rowid();
                Ok(Action {
                    id: id as u64,
                    session_id,
                    action_type,
                    occurred_at: now,
                    payload: Value::Null,
                })
            })
            .await?;

        let action = Action { payload: payload.clone(), ..action };

        self.events.publish(&ActionEvent {
            session_id,
            action_type,
            data: Some(payload).filter(|v| !v.is_null()),
            created_at: action.occurred_at,
        });

        Ok(action)
    }

    pub async fn actions_by_session(&self, session_id: u64) -> Result<Vec<Action>, PaigeError> {
        self.query(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, session_id, action_type, data_json, created_at
                     FROM action_log WHERE session_id = ?1 ORDER BY created_at ASC",
                )
                .map_err(storage_err("prepare actions_by_session"))?;
            read_actions(&mut stmt, params![session_id as i64])
        })
        .await
    }

    pub async fn actions_by_type(
        &self,
        session_id: u64,
        action_type: ActionType,
    ) -> Result<Vec<Action>, PaigeError> {
        self.query(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, session_id, action_type, data_json, created_at
                     FROM action_log WHERE session_id = ?1 AND action_type = ?2
                     ORDER BY created_at ASC",
                )
                .map_err(storage_err("prepare actions_by_type"))?;
            read_actions(
                &mut stmt,
                params![session_id as i64, action_type_str(action_type)],
            )
        })
        .await
    }

    pub async fn actions_recent(
        &self,
        session_id: u64,
        limit: u32,
    ) -> Result<Vec<Action>, PaigeError> {
        self.query(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, session_id, action_type, data_json, created_at
                     FROM action_log WHERE session_id = ?1
                     ORDER BY created_at DESC LIMIT ?2",
                )
                .map_err(storage_err("prepare actions_recent"))?;
            read_actions(&mut stmt, params![session_id as i64, limit])
        })
        .await
    }

    /// Logs a completed or failed model call. `latency_ms = -1` and zero
    /// token/cost fields signal a failed call, per spec §4.4.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_api_call(
        &self,
        session_id: u64,
        caller: String,
        model_tier: String,
        input_tokens: u64,
        output_tokens: u64,
        cost_usd: f64,
        latency_ms: i64,
        succeeded: bool,
    ) -> Result<ApiCallLogEntry, PaigeError> {
        self.query(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO api_call_log
                    (session_id, call_type, model, latency_ms, input_tokens, output_tokens,
                     cost_estimate, succeeded, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session_id as i64,
                    caller,
                    model_tier,
                    latency_ms,
                    input_tokens as i64,
                    output_tokens as i64,
                    cost_usd,
                    succeeded as i32,
                    now.to_rfc3339(),
                ],
            )
            .map_err(storage_err("insert api_call_log"))?;
            let id = conn.last_insert_rowid();
            Ok(ApiCallLogEntry {
                id: id as u64,
                session_id,
                caller,
                model_tier,
                input_tokens,
                output_tokens,
                cost_usd,
                latency_ms: latency_ms.max(0) as u64,
                succeeded,
                occurred_at: now,
            })
        })
        .await
    }

    pub async fn total_cost_for_session(&self, session_id: u64) -> Result<f64, PaigeError> {
        self.query(move |conn| {
            conn.query_row(
                "SELECT COALESCE(SUM(cost_estimate), 0.0) FROM api_call_log WHERE session_id = ?1",
                params![session_id as i64],
                |row| row.get(0),
            )
            .map_err(storage_err("total_cost_for_session"))
        })
        .await
    }

    pub async fn api_calls_by_session(
        &self,
        session_id: u64,
    ) -> Result<Vec<ApiCallLogEntry>, PaigeError> {
        self.query(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, session_id, call_type, model, latency_ms, input_tokens,
                            output_tokens, cost_estimate, succeeded, created_at
                     FROM api_call_log WHERE session_id = ?1 ORDER BY created_at ASC",
                )
                .map_err(storage_err("prepare api_calls_by_session"))?;
            let rows = stmt
                .query_map(params![session_id as i64], |row| {
                    let latency_ms: i64 = row.get(4)?;
                    let created_at: String = row.get(9)?;
                    Ok(ApiCallLogEntry {
                        id: row.get::<_, i64>(0)? as u64,
                        session_id: row.get::<_, i64>(1)? as u64,
                        caller: row.get(2)?,
                        model_tier: row.get(3)?,
                        latency_ms: latency_ms.max(0) as u64,
                        input_tokens: row.get::<_, i64>(5)? as u64,
                        output_tokens: row.get::<_, i64>(6)? as u64,
                        cost_usd: row.get(7)?,
                        succeeded: row.get::<_, i32>(8)? != 0,
                        occurred_at: parse_rfc3339(&created_at),
                    })
                })
                .map_err(storage_err("query api_calls_by_session"))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(storage_err("read api_call_log row"))?);
            }
            Ok(out)
        })
        .await
    }

    /// Whether a session row with the given id still exists, used by
    /// `get_session_state` and restore flows.
    pub async fn session_exists(&self, session_id: u64) -> Result<bool, PaigeError> {
        self.query(move |conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sessions WHERE id = ?1",
                    params![session_id as i64],
                    |r| r.get(0),
                )
                .map_err(storage_err("session_exists"))?;
            Ok(count > 0)
        })
        .await
    }

    /// Fetches one session row, used by restore and end flows.
    pub async fn get_session(&self, session_id: u64) -> Result<Session, PaigeError> {
        self.query(move |conn| {
            conn.query_row(
                "SELECT id, project_dir, status, started_at, ended_at, issue_number,
                        issue_title, branch_name, stash_name
                 FROM sessions WHERE id = ?1",
                params![session_id as i64],
                |row| {
                    let status_str: String = row.get(2)?;
                    let started_at: String = row.get(3)?;
                    let ended_at: Option<String> = row.get(4)?;
                    Ok(Session {
                        id: row.get::<_, i64>(0)? as u64,
                        project_dir: PathBuf::from(row.get::<_, String>(1)?),
                        status: parse_status(&status_str),
                        started_at: parse_rfc3339(&started_at),
                        ended_at: ended_at.map(|s| parse_rfc3339(&s)),
                        issue_number: row.get::<_, Option<i64>>(5)?.map(|n| n as u64),
                        issue_title: row.get(6)?,
                        branch_name: row.get(7)?,
                        stash_name: row.get(8)?,
                    })
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => PaigeError::UnknownSession { session_id },
                other => storage_err("get_session")(other),
            })
        })
        .await
    }
}

fn read_actions(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> Result<Vec<Action>, PaigeError> {
    let rows = stmt
        .query_map(params, |row| {
            let action_type_str: String = row.get(2)?;
            let data_json: Option<String> = row.get(3)?;
            let created_at: String = row.get(4)?;
            Ok(Action {
                id: row.get::<_, i64>(0)? as u64,
                session_id: row.get::<_, i64>(1)? as u64,
                action_type: parse_action_type(&action_type_str),
                occurred_at: parse_rfc3339(&created_at),
                payload: data_json
                    .and_then(|s| serde_json::from_str(&s).ok())
                    .unwrap_or(Value::Null),
            })
        })
        .map_err(storage_err("query action_log"))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(storage_err("read action_log row"))?);
    }
    Ok(out)
}

fn storage_err(op: &'static str) -> impl FnOnce(rusqlite::Error) -> PaigeError {
    move |e| PaigeError::Storage {
        message: format!("{op}: {e}"),
    }
}

fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn status_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Active => "active",
        SessionStatus::Completed => "completed",
        SessionStatus::Cancelled => "cancelled",
        SessionStatus::Errored => "errored",
    }
}

fn parse_status(s: &str) -> SessionStatus {
    match s {
        "completed" => SessionStatus::Completed,
        "cancelled" => SessionStatus::Cancelled,
        "errored" => SessionStatus::Errored,
        _ => SessionStatus::Active,
    }
}

fn action_type_str(action_type: ActionType) -> &'static str {
    match action_type {
        ActionType::SessionStarted => "session_started",
        ActionType::SessionEnded => "session_ended",
        ActionType::FileOpened => "file_opened",
        ActionType::BufferUpdated => "buffer_updated",
        ActionType::BufferSignificantChange => "buffer_significant_change",
        ActionType::BufferSummary => "buffer_summary",
        ActionType::ExplainRequested => "explain_requested",
        ActionType::ObserverTriage => "observer_triage",
        ActionType::NudgeDelivered => "nudge_delivered",
        ActionType::NudgeSuppressed => "nudge_suppressed",
        ActionType::ToolCalled => "tool_called",
        ActionType::PhaseCompleted => "phase_completed",
        ActionType::ReviewCompleted => "review_completed",
        ActionType::Error => "error",
    }
}

fn parse_action_type(s: &str) -> ActionType {
    match s {
        "session_started" => ActionType::SessionStarted,
        "session_ended" => ActionType::SessionEnded,
        "file_opened" => ActionType::FileOpened,
        "buffer_updated" => ActionType::BufferUpdated,
        "buffer_significant_change" => ActionType::BufferSignificantChange,
        "buffer_summary" => ActionType::BufferSummary,
        "explain_requested" => ActionType::ExplainRequested,
        "observer_triage" => ActionType::ObserverTriage,
        "nudge_delivered" => ActionType::NudgeDelivered,
        "nudge_suppressed" => ActionType::NudgeSuppressed,
        "tool_called" => ActionType::ToolCalled,
        "phase_completed" => ActionType::PhaseCompleted,
        "review_completed" => ActionType::ReviewCompleted,
        _ => ActionType::Error,
    }
}

#[cfg(test)]
#[path = "store.test.rs"]
mod tests;
