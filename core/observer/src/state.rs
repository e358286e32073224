//! Per-session Observer state (spec §4.8): counters, flow-state ring
//! buffer, cooldown clock and lifecycle status.

use std::collections::VecDeque;
use std::time::Duration;
use std::time::Instant;

use paige_protocol::ActionType;

/// Lifecycle status of a per-session Observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverStatus {
    Inactive,
    Active,
    Muted,
    Stopped,
}

/// What the trigger table (spec §4.8) decided about one incoming action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TriggerOutcome {
    /// This action type never triggers triage.
    NoTrigger,
    /// A counter policy has not yet reached its threshold.
    CounterPending,
    /// Triage should run.
    Triggered,
}

/// Whether an action type counts as user-initiated for flow-state
/// purposes (spec §4.8 step 2).
pub(crate) fn is_user_initiated(action_type: ActionType) -> bool {
    matches!(
        action_type,
        ActionType::FileOpened
            | ActionType::BufferUpdated
            | ActionType::BufferSignificantChange
            | ActionType::BufferSummary
            | ActionType::ExplainRequested
            | ActionType::PhaseCompleted
    )
}

pub(crate) struct SessionObserverState {
    pub status: ObserverStatus,
    pub buffer_update_count: u32,
    pub explain_request_count: u32,
    pub last_nudge_at: Option<Instant>,
    pub flow_ring: VecDeque<Instant>,
    pub triage_in_flight: bool,
}

impl SessionObserverState {
    pub fn new() -> Self {
        Self {
            status: ObserverStatus::Inactive,
            buffer_update_count: 0,
            explain_request_count: 0,
            last_nudge_at: None,
            flow_ring: VecDeque::new(),
            triage_in_flight: false,
        }
    }

    /// Applies the spec §4.8 trigger table, mutating the relevant
    /// counter as a side effect. Counter mutation happens unconditionally
    /// here, ahead of any suppression check, per the resolved Open
    /// Question in spec §9 (flow state still lets counters advance).
    pub fn apply_trigger_table(
        &mut self,
        action_type: ActionType,
        buffer_update_trigger_count: u32,
        explain_request_trigger_count: u32,
    ) -> TriggerOutcome {
        match action_type {
            ActionType::FileOpened => TriggerOutcome::Triggered,
            ActionType::PhaseCompleted => {
                self.buffer_update_count = 0;
                TriggerOutcome::Triggered
            }
            ActionType::BufferSignificantChange | ActionType::BufferSummary => {
                self.buffer_update_count += 1;
                if self.buffer_update_count >= buffer_update_trigger_count {
                    self.buffer_update_count = 0;
                    TriggerOutcome::Triggered
                } else {
                    TriggerOutcome::CounterPending
                }
            }
            ActionType::ExplainRequested => {
                self.explain_request_count += 1;
                if self.explain_request_count >= explain_request_trigger_count {
                    self.explain_request_count = 0;
                    TriggerOutcome::Triggered
                } else {
                    TriggerOutcome::CounterPending
                }
            }
            _ => TriggerOutcome::NoTrigger,
        }
    }

    /// Evicts ring-buffer entries older than `window` (spec §4.8 step 3).
    pub fn evict_stale_flow_entries(&mut self, now: Instant, window: Duration) {
        while let Some(&front) = self.flow_ring.front() {
            if now.duration_since(front) > window {
                self.flow_ring.pop_front();
            } else {
                break;
            }
        }
    }

    /// Records a user-initiated action's timestamp in the flow-state ring.
    pub fn push_flow_entry(&mut self, now: Instant) {
        self.flow_ring.push_back(now);
    }

    /// Whether the ring buffer currently indicates flow state.
    pub fn flow_state_active(&self, threshold: usize) -> bool {
        self.flow_ring.len() >= threshold
    }

    pub fn in_cooldown(&self, now: Instant, cooldown: Duration) -> bool {
        match self.last_nudge_at {
            Some(last) => now.duration_since(last) < cooldown,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_trigger_fires_at_threshold_and_resets() {
        let mut state = SessionObserverState::new();
        for _ in 0..4 {
            let outcome = state.apply_trigger_table(ActionType::BufferSignificantChange, 5, 3);
            assert_eq!(outcome, TriggerOutcome::CounterPending);
        }
        let outcome = state.apply_trigger_table(ActionType::BufferSignificantChange, 5, 3);
        assert_eq!(outcome, TriggerOutcome::Triggered);
        assert_eq!(state.buffer_update_count, 0);
    }

    #[test]
    fn buffer_summary_counts_toward_the_same_threshold() {
        let mut state = SessionObserverState::new();
        state.apply_trigger_table(ActionType::BufferSignificantChange, 5, 3);
        let outcome = state.apply_trigger_table(ActionType::BufferSummary, 5, 3);
        assert_eq!(outcome, TriggerOutcome::CounterPending);
        assert_eq!(state.buffer_update_count, 2);
    }

    #[test]
    fn raw_buffer_update_never_triggers_directly() {
        let mut state = SessionObserverState::new();
        let outcome = state.apply_trigger_table(ActionType::BufferUpdated, 5, 3);
        assert_eq!(outcome, TriggerOutcome::NoTrigger);
        assert_eq!(state.buffer_update_count, 0);
    }

    #[test]
    fn phase_completed_resets_buffer_counter() {
        let mut state = SessionObserverState::new();
        state.apply_trigger_table(ActionType::BufferSignificantChange, 5, 3);
        state.apply_trigger_table(ActionType::BufferSignificantChange, 5, 3);
        assert_eq!(state.buffer_update_count, 2);
        state.apply_trigger_table(ActionType::PhaseCompleted, 5, 3);
        assert_eq!(state.buffer_update_count, 0);
    }

    #[test]
    fn flow_state_detects_eleventh_action_in_window() {
        let mut state = SessionObserverState::new();
        let now = Instant::now();
        for _ in 0..10 {
            state.evict_stale_flow_entries(now, Duration::from_secs(60));
            assert!(!state.flow_state_active(10));
            state.push_flow_entry(now);
        }
        state.evict_stale_flow_entries(now, Duration::from_secs(60));
        assert!(state.flow_state_active(10));
    }
}
