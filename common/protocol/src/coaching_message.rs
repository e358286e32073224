//! Coaching nudge and explanation types (spec §3, §4.8, §4.9).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Why the Observer decided to deliver (or suppress) a nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeTrigger {
    BufferUpdateThreshold,
    ExplainRequestThreshold,
    Manual,
}

/// A proactive coaching nudge delivered to the UI (spec §4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingMessage {
    pub id: u64,
    pub session_id: u64,
    pub trigger: NudgeTrigger,
    pub confidence: f64,
    pub title: String,
    pub body: String,
    pub delivered_at: DateTime<Utc>,
}

/// A response to an explicit `explain` tool/UI request (spec §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationEntry {
    pub id: u64,
    pub session_id: u64,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coaching_message_round_trips() {
        let msg = CoachingMessage {
            id: 1,
            session_id: 1,
            trigger: NudgeTrigger::BufferUpdateThreshold,
            confidence: 0.82,
            title: "Consider extracting this".to_string(),
            body: "This function is doing three things.".to_string(),
            delivered_at: Utc::now(),
        };
        let s = serde_json::to_string(&msg).expect("serialize");
        let back: CoachingMessage = serde_json::from_str(&s).expect("deserialize");
        assert_eq!(back.title, msg.title);
    }
}
