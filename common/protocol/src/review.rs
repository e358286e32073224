//! Review Agent result types (spec §3, §4.10).

use serde::Deserialize;
use serde::Serialize;

/// Severity of a single review finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Info,
    Warning,
    Blocking,
}

/// A single issue surfaced by the Review Agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewFinding {
    pub severity: FindingSeverity,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
}

/// The Review Agent's final verdict for a phase or session (spec §4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub approved: bool,
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<ReviewFinding>,
}

impl ReviewResult {
    /// A conservative fallback used when the model's final message could
    /// not be parsed as structured JSON (spec §4.10 edge case).
    pub fn unparseable_fallback(raw_text: &str) -> Self {
        Self {
            approved: false,
            summary: format!("Review result could not be parsed: {raw_text}"),
            findings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_not_approved() {
        let fallback = ReviewResult::unparseable_fallback("not json");
        assert!(!fallback.approved);
        assert!(fallback.findings.is_empty());
    }
}
