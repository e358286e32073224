//! Review Agent input types (spec §4.10).

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// What the Review Agent should focus its attention on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewScope {
    CurrentFile,
    OpenFiles,
    CurrentTask,
    Phase,
}

/// A single task handed to the agent for `CurrentTask`/`Phase` scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewTask {
    pub title: String,
    pub description: String,
}

/// Input to [`crate::agent::ReviewAgent::run`] (spec §4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAgentInput {
    pub scope: ReviewScope,
    pub project_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_file_paths: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<ReviewTask>>,
}

impl ReviewAgentInput {
    /// Renders the user-facing framing for the first turn of the loop.
    pub fn describe(&self) -> String {
        let mut out = format!("Review scope: {:?}\nProject: {}\n", self.scope, self.project_dir.display());
        if let Some(title) = &self.phase_title {
            out.push_str(&format!("Phase: {title}\n"));
        }
        if let Some(path) = &self.active_file_path {
            out.push_str(&format!("Active file: {}\n", path.display()));
        }
        if let Some(paths) = &self.open_file_paths {
            out.push_str("Open files:\n");
            for path in paths {
                out.push_str(&format!("- {}\n", path.display()));
            }
        }
        if let Some(tasks) = &self.tasks {
            out.push_str("Tasks:\n");
            for task in tasks {
                out.push_str(&format!("- {}: {}\n", task.title, task.description));
            }
        }
        out
    }
}
