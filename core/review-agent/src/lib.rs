//! The Review Agent (spec §4.10): a bounded, tool-using loop that turns
//! a review scope into a structured [`paige_protocol::ReviewResult`].

mod agent;
mod input;

/// The fixed read-only workspace tool set (`read_file`, `git_diff`,
/// `list_files`), reused by the coaching pipeline's Plan stage for its
/// own exploration loop (spec §4.9).
pub mod tools;

pub use agent::run;
pub use input::ReviewAgentInput;
pub use input::ReviewScope;
pub use input::ReviewTask;
