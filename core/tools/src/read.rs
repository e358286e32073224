//! Read tools (spec §4.7): `paige_get_buffer`, `paige_get_open_files`,
//! `paige_get_diff`, `paige_get_session_state`.

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use similar::ChangeTag;
use similar::TextDiff;

use paige_error::PaigeError;

use crate::context::ToolContext;
use crate::path_guard::validate_path;
use crate::tool::Tool;

pub struct GetBuffer;

#[async_trait]
impl Tool for GetBuffer {
    fn name(&self) -> &str {
        "paige_get_buffer"
    }

    fn description(&self) -> &str {
        "Returns the cached editor buffer for a path, with whether it has \
         unlogged edits pending, or null if the path has no tracked buffer."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "required": ["path"],
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let path = requested_path(&input)?;
        let resolved = validate_path(&path, &ctx.project_dir)?;

        let Some(buffer) = ctx.buffer_cache.get(&resolved) else {
            return Ok(Value::Null);
        };
        let dirty = ctx.buffer_cache.dirty_paths().contains(&resolved);

        Ok(json!({
            "content": buffer.content,
            "dirty": dirty,
        }))
    }
}

pub struct GetOpenFiles;

#[async_trait]
impl Tool for GetOpenFiles {
    fn name(&self) -> &str {
        "paige_get_open_files"
    }

    fn description(&self) -> &str {
        "Returns the paths the UI has reported open."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        Ok(json!({ "files": ctx.open_files() }))
    }
}

pub struct GetDiff;

#[async_trait]
impl Tool for GetDiff {
    fn name(&self) -> &str {
        "paige_get_diff"
    }

    fn description(&self) -> &str {
        "Returns a unified diff between the on-disk contents and the cached \
         buffer contents for a path, or for every dirty path when omitted."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let paths = match input.get("path").and_then(Value::as_str) {
            Some(path) => vec![validate_path(path, &ctx.project_dir)?],
            None => ctx.buffer_cache.dirty_paths(),
        };

        let mut diffs = Vec::new();
        for path in paths {
            let Some(buffer) = ctx.buffer_cache.get(&path) else {
                continue;
            };
            let on_disk = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            let diff = unified_diff(&path.to_string_lossy(), &on_disk, &buffer.content);
            if !diff.is_empty() {
                diffs.push(diff);
            }
        }

        Ok(json!({ "diff": diffs.join("\n") }))
    }
}

fn unified_diff(label: &str, old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut out = String::new();
    out.push_str(&format!("--- a/{label}\n+++ b/{label}\n"));
    for change in diff.iter_all_changes() {
        let prefix = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(prefix);
        out.push_str(change.value());
    }
    out
}

pub struct GetSessionState;

#[async_trait]
impl Tool for GetSessionState {
    fn name(&self) -> &str {
        "paige_get_session_state"
    }

    fn description(&self) -> &str {
        "Returns the active session, its open files, and a summary of \
         buffers with pending edits."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"include": {"type": "array", "items": {"type": "string"}}},
        })
    }

    async fn execute(&self, _input: Value, ctx: &ToolContext) -> Result<Value, PaigeError> {
        let session = ctx
            .session_registry
            .active_session()
            .ok_or(PaigeError::NoActiveSession)?;

        Ok(json!({
            "session": session,
            "open_files": ctx.open_files(),
            "dirty_paths": ctx.buffer_cache.dirty_paths(),
        }))
    }
}

fn requested_path(input: &Value) -> Result<String, PaigeError> {
    input
        .get("path")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PaigeError::Validation {
            message: "path is required".to_string(),
        })
}

#[cfg(test)]
#[path = "read.test.rs"]
mod tests;
