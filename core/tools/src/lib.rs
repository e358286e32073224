//! The tool surface (spec §4.7, §9): a fixed set of 14 `paige_*`-named
//! tools an external AI host invokes to read coaching-session state and
//! drive UI events. Read-only invariant: no tool mutates workspace
//! files, enforced at registration by [`ToolRegistry::register`].

mod context;
mod lifecycle;
mod path_guard;
mod read;
mod registry;
mod tool;
mod ui_control;

pub use context::HighlightRange;
pub use context::ToolContext;
pub use path_guard::validate_path;
pub use registry::EXPECTED_TOOL_NAMES;
pub use registry::ToolRegistry;
pub use tool::Tool;

use std::sync::Arc;

/// Builds a [`ToolRegistry`] with all 14 tools registered.
pub fn build_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(lifecycle::StartSession));
    registry.register(Arc::new(lifecycle::EndSession));
    registry.register(Arc::new(read::GetBuffer));
    registry.register(Arc::new(read::GetOpenFiles));
    registry.register(Arc::new(read::GetDiff));
    registry.register(Arc::new(read::GetSessionState));
    registry.register(Arc::new(ui_control::OpenFile));
    registry.register(Arc::new(ui_control::HighlightLines));
    registry.register(Arc::new(ui_control::ClearHighlights));
    registry.register(Arc::new(ui_control::HintFiles));
    registry.register(Arc::new(ui_control::ClearHints));
    registry.register(Arc::new(ui_control::UpdatePhase));
    registry.register(Arc::new(ui_control::ShowMessage));
    registry.register(Arc::new(ui_control::ShowIssueContext));
    registry
}
