//! Session and phase types (spec §3).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// Lifecycle status of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
    Errored,
}

/// A coaching session. At most one may be `Active` per process
/// (enforced by the session registry, not by this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Monotonic identity; the sole key used for equality/lookup.
    pub id: u64,
    pub project_dir: PathBuf,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stash_name: Option<String>,
}

impl Session {
    /// Start a new, active session with the given id and project directory.
    pub fn new(id: u64, project_dir: PathBuf) -> Self {
        Self {
            id,
            project_dir,
            status: SessionStatus::Active,
            started_at: Utc::now(),
            ended_at: None,
            issue_number: None,
            issue_title: None,
            branch_name: None,
            stash_name: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Status of a single [`Phase`] within a [`Plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Active,
    Complete,
}

/// A single actionable step within a phase's task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseStep {
    pub title: String,
    pub description: String,
}

/// One of the five coarse workflow stages (spec GLOSSARY).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    /// 1..5.
    pub number: u8,
    pub title: String,
    pub status: PhaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<PhaseStep>>,
}

impl Phase {
    pub fn new(number: u8, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            status: PhaseStatus::Pending,
            summary: None,
            steps: None,
        }
    }
}

/// Owns an ordered set of [`Phase`]s for a session. Invariant: exactly one
/// phase is `Active` unless all are `Complete` or none has been reached yet.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Plan {
    pub title: String,
    pub summary: String,
    pub phases: Vec<Phase>,
}

impl Plan {
    /// The currently active phase, if any.
    pub fn active_phase(&self) -> Option<&Phase> {
        self.phases.iter().find(|p| p.status == PhaseStatus::Active)
    }

    /// Whether the active-phase invariant holds: at most one `Active`.
    pub fn invariant_holds(&self) -> bool {
        self.phases
            .iter()
            .filter(|p| p.status == PhaseStatus::Active)
            .count()
            <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_active() {
        let s = Session::new(1, PathBuf::from("/tmp/proj"));
        assert!(s.is_active());
        assert!(s.ended_at.is_none());
    }

    #[test]
    fn plan_invariant_rejects_two_active_phases() {
        let mut plan = Plan::default();
        let mut a = Phase::new(1, "Understand");
        a.status = PhaseStatus::Active;
        let mut b = Phase::new(2, "Plan");
        b.status = PhaseStatus::Active;
        plan.phases = vec![a, b];
        assert!(!plan.invariant_holds());
    }
}
