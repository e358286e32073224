//! Tool trait definition (spec §4.7): a single `execute` stage, no
//! permission pipeline — every tool in this surface is either read-only
//! or a UI-control broadcast, never a workspace mutation.

use async_trait::async_trait;
use serde_json::Value;

use paige_error::PaigeError;
use paige_protocol::ToolDefinition;

use crate::context::ToolContext;

/// A tool callable through the tool surface (spec §4.7).
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> Value;

    /// Execute the tool with the given input, returning its JSON result.
    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyTool;

    #[async_trait]
    impl Tool for DummyTool {
        fn name(&self) -> &str {
            "paige_dummy"
        }

        fn description(&self) -> &str {
            "A dummy tool for testing"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _input: Value, _ctx: &ToolContext) -> Result<Value, PaigeError> {
            Ok(serde_json::json!({"success": true}))
        }
    }

    #[tokio::test]
    async fn to_definition_carries_name_and_schema() {
        let tool = DummyTool;
        let def = tool.to_definition();
        assert_eq!(def.name, "paige_dummy");
        assert!(def.input_schema.is_object());
    }
}
