//! Uniform model-call interface with structured-output parsing,
//! refusal/overflow handling and cost accounting (spec §4.4).

mod caller;
mod client;
mod types;

pub use caller::call;
pub use caller::input_hash;
pub use caller::strip_markdown_fence;
pub use client::ModelClient;
pub use client::NoopModelClient;
pub use types::CallOptions;
pub use types::ModelTier;
pub use types::RawModelResponse;
pub use types::StopReason;
pub use types::ToolUseBlock;
pub use types::compute_cost;
