//! Model tier registry, pricing table and call options (spec §4.4).

use paige_protocol::ToolDefinition;
use serde::Deserialize;
use serde::Serialize;

/// One of the three model tiers callers may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Haiku,
    Sonnet,
    Opus,
}

impl ModelTier {
    /// Wire label used in logs and the `model_tier` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Haiku => "haiku",
            Self::Sonnet => "sonnet",
            Self::Opus => "opus",
        }
    }

    /// The concrete provider model ID this tier resolves to.
    pub fn provider_model_id(self) -> &'static str {
        match self {
            Self::Haiku => "claude-haiku-4-5",
            Self::Sonnet => "claude-sonnet-4-5",
            Self::Opus => "claude-opus-4-1",
        }
    }

    /// `(input_per_million, output_per_million)` USD pricing.
    pub fn pricing(self) -> (f64, f64) {
        match self {
            Self::Haiku => (0.80, 4.0),
            Self::Sonnet => (3.0, 15.0),
            Self::Opus => (15.0, 75.0),
        }
    }
}

/// `Call[T]` options (spec §4.4). `max_tokens` defaults to 4096 via
/// [`CallOptions::new`].
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub call_type: String,
    pub model: ModelTier,
    pub system_prompt: String,
    pub user_message: String,
    pub session_id: u64,
    pub max_tokens: u32,
    pub tools: Option<Vec<ToolDefinition>>,
}

impl CallOptions {
    pub fn new(
        call_type: impl Into<String>,
        model: ModelTier,
        system_prompt: impl Into<String>,
        user_message: impl Into<String>,
        session_id: u64,
    ) -> Self {
        Self {
            call_type: call_type.into(),
            model,
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
            session_id,
            max_tokens: 4096,
            tools: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }
}

/// Why the provider stopped generating (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    Refusal,
    MaxTokens,
}

/// A single tool-use request the model asked the caller to execute.
#[derive(Debug, Clone)]
pub struct ToolUseBlock {
    pub call_id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Raw response from a [`crate::client::ModelClient`] call, before
/// schema parsing.
#[derive(Debug, Clone)]
pub struct RawModelResponse {
    pub stop_reason: StopReason,
    pub text: Option<String>,
    pub tool_uses: Vec<ToolUseBlock>,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Computes `cost = (in_tok/1e6)*in_rate + (out_tok/1e6)*out_rate`
/// (spec §4.4), rounded to 6 decimal places.
pub fn compute_cost(tier: ModelTier, input_tokens: u64, output_tokens: u64) -> f64 {
    let (in_rate, out_rate) = tier.pricing();
    let raw =
        (input_tokens as f64 / 1_000_000.0) * in_rate + (output_tokens as f64 / 1_000_000.0) * out_rate;
    paige_protocol::round_cost(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_cost_matches_sonnet_scenario() {
        let cost = compute_cost(ModelTier::Sonnet, 2000, 1000);
        assert!((cost - 0.021).abs() < 1e-9);
    }
}
