//! Model API call cost/latency accounting (spec §3, §4.3, §4.4).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// One completed (or failed) call to an external model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallLogEntry {
    pub id: u64,
    pub session_id: u64,
    /// Logical caller, e.g. "observer.classifier" or "coaching.plan".
    pub caller: String,
    pub model_tier: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Cost in USD, rounded to 6 decimal places (spec §8).
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub succeeded: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Rounds a raw cost computation to 6 decimal places, matching the
/// precision the persisted log and UI display expect (spec §8).
pub fn round_cost(raw: f64) -> f64 {
    (raw * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_cost_rounds_to_six_places() {
        assert_eq!(round_cost(0.000_001_24), 0.000_001);
        assert_eq!(round_cost(0.000_001_26), 0.000_001);
        assert_eq!(round_cost(1.234_567_89), 1.234_568);
    }
}
