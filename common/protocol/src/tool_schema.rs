//! Tool surface schema types shared between `paige-tools` and the protocol
//! layer (spec §4.7, §6).

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Static description of a callable tool, as advertised to the external
/// AI host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A request to invoke one tool by name with arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// The outcome of a tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub call_id: String,
    pub is_error: bool,
    pub content: Value,
}

impl ToolCallResult {
    pub fn ok(call_id: impl Into<String>, content: Value) -> Self {
        Self {
            call_id: call_id.into(),
            is_error: false,
            content,
        }
    }

    pub fn error(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            is_error: true,
            content: Value::String(message.into()),
        }
    }
}
