//! The Review Agent's fixed read-only tool set (spec §4.10): `read_file`,
//! `git_diff`, `list_files`. Every path argument is resolved relative to
//! `project_dir` through [`paige_tools::validate_path`] — the same
//! containment check the tool surface enforces — so the agent can never
//! read outside the project root.

use std::path::Path;

use paige_error::PaigeError;
use paige_protocol::ToolDefinition;
use serde_json::Value;
use serde_json::json;

/// The three tool schemas the model is told about every turn.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "read_file".to_string(),
            description: "Reads the full contents of a file in the project.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"],
            }),
        },
        ToolDefinition {
            name: "git_diff".to_string(),
            description: "Returns `git diff` output for the project, optionally scoped to a path."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
            }),
        },
        ToolDefinition {
            name: "list_files".to_string(),
            description: "Lists project files under a directory, respecting .gitignore."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
            }),
        },
    ]
}

/// Executes one of the three tools by name.
pub async fn execute(name: &str, arguments: &Value, project_dir: &Path) -> Result<Value, PaigeError> {
    match name {
        "read_file" => read_file(arguments, project_dir).await,
        "git_diff" => git_diff(arguments, project_dir).await,
        "list_files" => list_files(arguments, project_dir),
        other => Err(PaigeError::Validation {
            message: format!("unknown review-agent tool: {other}"),
        }),
    }
}

async fn read_file(arguments: &Value, project_dir: &Path) -> Result<Value, PaigeError> {
    let path = arguments
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| PaigeError::Validation {
            message: "read_file requires path".to_string(),
        })?;
    let resolved = paige_tools::validate_path(path, project_dir)?;
    let content = tokio::fs::read_to_string(&resolved)
        .await
        .map_err(|_| PaigeError::FileNotFound { path: resolved })?;
    Ok(json!({ "content": content }))
}

async fn git_diff(arguments: &Value, project_dir: &Path) -> Result<Value, PaigeError> {
    let scoped = match arguments.get("path").and_then(Value::as_str) {
        Some(path) => Some(paige_tools::validate_path(path, project_dir)?),
        None => None,
    };

    let mut command = tokio::process::Command::new("git");
    command.arg("-C").arg(project_dir).arg("diff");
    if let Some(path) = &scoped {
        command.arg("--").arg(path);
    }

    let output = command
        .output()
        .await
        .map_err(|e| PaigeError::Internal {
            message: format!("failed to run git diff: {e}"),
        })?;
    let diff = String::from_utf8_lossy(&output.stdout).into_owned();
    Ok(json!({ "diff": diff }))
}

fn list_files(arguments: &Value, project_dir: &Path) -> Result<Value, PaigeError> {
    let root = match arguments.get("path").and_then(Value::as_str) {
        Some(path) => paige_tools::validate_path(path, project_dir)?,
        None => project_dir.to_path_buf(),
    };

    let mut files = Vec::new();
    for entry in ignore::WalkBuilder::new(&root).hidden(false).build() {
        let entry = entry.map_err(|e| PaigeError::Internal {
            message: format!("failed to walk {}: {e}", root.display()),
        })?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(json!({ "files": files }))
}

#[cfg(test)]
#[path = "tools.test.rs"]
mod tests;
