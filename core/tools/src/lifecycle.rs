//! Lifecycle tools (spec §4.7): `paige_start_session`, `paige_end_session`.

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use paige_error::PaigeError;
use paige_session::EndReason;

use crate::context::ToolContext;
use crate::tool::Tool;

pub struct StartSession;

#[async_trait]
impl Tool for StartSession {
    fn name(&self) -> &str {
        "paige_start_session"
    }

    fn description(&self) -> &str {
        "Starts a new coaching session for the given project directory. \
         Errors if a session is already active."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_dir": {"type": "string"},
                "issue_number": {"type": "integer"},
                "issue_title": {"type": "string"},
            },
            "required": ["project_dir"],
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let project_dir = input
            .get("project_dir")
            .and_then(Value::as_str)
            .ok_or_else(|| PaigeError::Validation {
                message: "start_session requires project_dir".to_string(),
            })?;
        let issue_number = input.get("issue_number").and_then(Value::as_u64);
        let issue_title = input
            .get("issue_title")
            .and_then(Value::as_str)
            .map(str::to_string);

        let session = ctx
            .session_registry
            .start(project_dir.into(), issue_number, issue_title, None, None)
            .await?;

        Ok(json!({
            "session_id": session.id,
            "project_dir": session.project_dir,
            "status": session.status,
        }))
    }
}

pub struct EndSession;

#[async_trait]
impl Tool for EndSession {
    fn name(&self) -> &str {
        "paige_end_session"
    }

    fn description(&self) -> &str {
        "Ends the currently active coaching session. Errors if none is active."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let session = ctx.session_registry.end(EndReason::Completed).await?;

        Ok(json!({
            "success": true,
            "session_id": session.id,
            "memories_added": 0,
            "gaps_identified": Value::Null,
            "katas_generated": Value::Null,
            "assessments_updated": Value::Null,
        }))
    }
}

#[cfg(test)]
#[path = "lifecycle.test.rs"]
mod tests;
