//! Append-only action log entry types (spec §3, §4.3).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// The kind of event recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SessionStarted,
    SessionEnded,
    FileOpened,
    BufferUpdated,
    BufferSignificantChange,
    BufferSummary,
    ExplainRequested,
    ObserverTriage,
    NudgeDelivered,
    NudgeSuppressed,
    ToolCalled,
    PhaseCompleted,
    ReviewCompleted,
    Error,
}

/// A single immutable record in the action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: u64,
    pub session_id: u64,
    pub action_type: ActionType,
    pub occurred_at: DateTime<Utc>,
    /// Free-form structured payload specific to `action_type`.
    pub payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_round_trips_through_json() {
        let action = Action {
            id: 1,
            session_id: 42,
            action_type: ActionType::BufferUpdated,
            occurred_at: Utc::now(),
            payload: serde_json::json!({ "path": "/a.rs" }),
        };
        let s = serde_json::to_string(&action).expect("serialize");
        let back: Action = serde_json::from_str(&s).expect("deserialize");
        assert_eq!(back.id, action.id);
        assert_eq!(back.action_type, ActionType::BufferUpdated);
    }
}
