//! Tool registry (spec §4.7, §9): enforces the read-only invariant at
//! registration and dispatches calls by name, logging a `tool_called`
//! action (system class) for every invocation.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use paige_error::PaigeError;
use paige_protocol::ActionType;
use paige_protocol::ToolDefinition;

use crate::context::ToolContext;
use crate::tool::Tool;

/// Names matching this pattern are refused at registration — the tool
/// surface may only read state or broadcast UI events (spec §4.7).
fn forbidden_name_pattern() -> Regex {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)write|edit|create|delete|remove|modify").unwrap()
}

/// Holds every registered tool, keyed by name.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool. Panics if its name matches the forbidden
    /// mutation-verb pattern — this is a programmer error (a tool this
    /// surface should never offer), not a runtime condition to recover
    /// from.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        assert!(
            !forbidden_name_pattern().is_match(&name),
            "tool name '{name}' matches the forbidden read-only-invariant pattern"
        );
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Looks up and invokes `name`, logging `tool_called` around the
    /// call regardless of outcome.
    pub async fn call(
        &self,
        name: &str,
        call_id: &str,
        input: Value,
        ctx: &ToolContext,
    ) -> Result<Value, PaigeError> {
        let tool = self
            .get(name)
            .ok_or_else(|| PaigeError::Validation {
                message: format!("unknown tool: {name}"),
            })?;

        let session_id = ctx.session_registry.active_session().map(|s| s.id);
        let result = tool.execute(input, ctx).await;

        if let Some(session_id) = session_id {
            let payload = serde_json::json!({
                "tool": name,
                "call_id": call_id,
                "success": result.is_ok(),
            });
            if let Err(err) = ctx
                .action_log
                .log_action(session_id, ActionType::ToolCalled, Some(payload))
                .await
            {
                tracing::error!(tool = name, %err, "failed to log tool_called");
            }
        }

        result
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The exact, ordered set of tool names this surface must expose
/// (spec §4.7, tested by §8's "14 tool names are exactly the
/// enumerated set").
pub const EXPECTED_TOOL_NAMES: &[&str] = &[
    "paige_start_session",
    "paige_end_session",
    "paige_get_buffer",
    "paige_get_open_files",
    "paige_get_diff",
    "paige_get_session_state",
    "paige_open_file",
    "paige_highlight_lines",
    "paige_clear_highlights",
    "paige_hint_files",
    "paige_clear_hints",
    "paige_update_phase",
    "paige_show_message",
    "paige_show_issue_context",
];

#[cfg(test)]
#[path = "registry.test.rs"]
mod tests;
