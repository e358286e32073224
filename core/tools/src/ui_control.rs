//! UI-control tools (spec §4.7): broadcast a UI event and record local
//! state (open files, highlights). None of these touch workspace files;
//! they only mutate the in-process [`ToolContext`] and the shared
//! broadcast channel every connected client subscribes to.

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use paige_error::PaigeError;
use paige_protocol::Buffer;
use paige_protocol::CoachingMessage;
use paige_protocol::NudgeTrigger;
use paige_protocol::Phase;
use paige_protocol::PhaseStatus;
use paige_protocol::ServerMessage;

use crate::context::HighlightRange;
use crate::context::ToolContext;
use crate::path_guard::validate_path;
use crate::tool::Tool;

const SUCCESS: fn() -> Value = || json!({"success": true});

fn required_str(input: &Value, field: &str) -> Result<String, PaigeError> {
    input
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PaigeError::Validation {
            message: format!("{field} is required"),
        })
}

pub struct OpenFile;

#[async_trait]
impl Tool for OpenFile {
    fn name(&self) -> &str {
        "paige_open_file"
    }

    fn description(&self) -> &str {
        "Tells the UI to open a file in the editor."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "required": ["path"],
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let path = required_str(&input, "path")?;
        let resolved = validate_path(&path, &ctx.project_dir)?;

        let content = match ctx.buffer_cache.get(&resolved) {
            Some(buffer) => buffer.content,
            None => std::fs::read_to_string(&resolved).map_err(|_| PaigeError::FileNotFound {
                path: resolved.clone(),
            })?,
        };

        ctx.mark_open(resolved.clone());
        ctx.broadcast(ServerMessage::BufferContent(Buffer::new(
            resolved, content,
        )));
        Ok(SUCCESS())
    }
}

pub struct HighlightLines;

#[async_trait]
impl Tool for HighlightLines {
    fn name(&self) -> &str {
        "paige_highlight_lines"
    }

    fn description(&self) -> &str {
        "Tells the UI to highlight one or more line ranges in a file."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "ranges": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "start": {"type": "integer"},
                            "end": {"type": "integer"},
                            "style": {"type": "string"},
                        },
                        "required": ["start", "end", "style"],
                    },
                },
            },
            "required": ["path", "ranges"],
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let path = required_str(&input, "path")?;
        let resolved = validate_path(&path, &ctx.project_dir)?;

        let ranges: Vec<HighlightRange> = input
            .get("ranges")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| PaigeError::Validation {
                message: format!("invalid ranges: {e}"),
            })?
            .ok_or_else(|| PaigeError::Validation {
                message: "ranges is required".to_string(),
            })?;

        ctx.set_highlights(resolved.clone(), ranges.clone());
        ctx.broadcast(ServerMessage::EditorDecorations(json!({
            "path": resolved,
            "ranges": ranges,
        })));
        Ok(SUCCESS())
    }
}

pub struct ClearHighlights;

#[async_trait]
impl Tool for ClearHighlights {
    fn name(&self) -> &str {
        "paige_clear_highlights"
    }

    fn description(&self) -> &str {
        "Clears highlights for a file, or every file when no path is given."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let resolved = match input.get("path").and_then(Value::as_str) {
            Some(path) => Some(validate_path(path, &ctx.project_dir)?),
            None => None,
        };

        ctx.clear_highlights(resolved.as_ref());
        ctx.broadcast(ServerMessage::EditorClearDecorations(json!({
            "path": resolved,
        })));
        Ok(SUCCESS())
    }
}

pub struct HintFiles;

#[async_trait]
impl Tool for HintFiles {
    fn name(&self) -> &str {
        "paige_hint_files"
    }

    fn description(&self) -> &str {
        "Tells the UI to hint one or more files in the explorer."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "paths": {"type": "array", "items": {"type": "string"}},
                "style": {"type": "string", "enum": ["subtle", "obvious", "unmissable"]},
            },
            "required": ["paths", "style"],
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let paths = input
            .get("paths")
            .and_then(Value::as_array)
            .ok_or_else(|| PaigeError::Validation {
                message: "paths is required".to_string(),
            })?;
        let style = required_str(&input, "style")?;

        let mut resolved_paths = Vec::with_capacity(paths.len());
        for p in paths {
            let s = p.as_str().ok_or_else(|| PaigeError::Validation {
                message: "paths must be strings".to_string(),
            })?;
            resolved_paths.push(validate_path(s, &ctx.project_dir)?);
        }

        ctx.broadcast(ServerMessage::ExplorerHintFiles(json!({
            "paths": resolved_paths,
            "style": style,
        })));
        Ok(SUCCESS())
    }
}

pub struct ClearHints;

#[async_trait]
impl Tool for ClearHints {
    fn name(&self) -> &str {
        "paige_clear_hints"
    }

    fn description(&self) -> &str {
        "Tells the UI to clear all explorer hints."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        ctx.broadcast(ServerMessage::ExplorerClearHints(json!({})));
        Ok(SUCCESS())
    }
}

pub struct UpdatePhase;

#[async_trait]
impl Tool for UpdatePhase {
    fn name(&self) -> &str {
        "paige_update_phase"
    }

    fn description(&self) -> &str {
        "Tells the UI a phase transitioned to a new status."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "phase": {"type": "integer"},
                "status": {"type": "string", "enum": ["pending", "active", "complete"]},
            },
            "required": ["phase", "status"],
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let phase_number =
            input
                .get("phase")
                .and_then(Value::as_u64)
                .ok_or_else(|| PaigeError::Validation {
                    message: "phase is required".to_string(),
                })?;
        let status_str = required_str(&input, "status")?;
        let status = match status_str.as_str() {
            "pending" => PhaseStatus::Pending,
            "active" => PhaseStatus::Active,
            "complete" => PhaseStatus::Complete,
            other => {
                return Err(PaigeError::Validation {
                    message: format!("unknown phase status: {other}"),
                });
            }
        };

        let mut phase = Phase::new(phase_number as u8, format!("Phase {phase_number}"));
        phase.status = status;
        ctx.broadcast(ServerMessage::PhaseTransition(phase));
        Ok(SUCCESS())
    }
}

pub struct ShowMessage;

#[async_trait]
impl Tool for ShowMessage {
    fn name(&self) -> &str {
        "paige_show_message"
    }

    fn description(&self) -> &str {
        "Tells the UI to display a coaching message to the learner."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {"type": "string"},
                "type": {"type": "string", "enum": ["hint", "info", "success", "warning"]},
            },
            "required": ["message", "type"],
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let message = required_str(&input, "message")?;
        let kind = required_str(&input, "type")?;
        let session_id = ctx
            .session_registry
            .active_session()
            .map(|s| s.id)
            .unwrap_or(0);

        ctx.broadcast(ServerMessage::CoachingMessage(CoachingMessage {
            id: 0,
            session_id,
            trigger: NudgeTrigger::Manual,
            confidence: 1.0,
            title: kind,
            body: message,
            delivered_at: chrono::Utc::now(),
        }));
        Ok(SUCCESS())
    }
}

pub struct ShowIssueContext;

#[async_trait]
impl Tool for ShowIssueContext {
    fn name(&self) -> &str {
        "paige_show_issue_context"
    }

    fn description(&self) -> &str {
        "Tells the UI to display context for the issue the session is \
         working on."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "summary": {"type": "string"},
            },
            "required": ["title", "summary"],
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        required_str(&input, "title")?;
        required_str(&input, "summary")?;
        ctx.broadcast(ServerMessage::DashboardIssue(input));
        Ok(SUCCESS())
    }
}

#[cfg(test)]
#[path = "ui_control.test.rs"]
mod tests;
