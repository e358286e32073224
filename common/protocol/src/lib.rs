//! Shared data model and wire types for paige (spec §3, §6).
//!
//! This crate has no async runtime or I/O dependency: it is pure data,
//! shared by every other `paige-*` crate that needs to speak the same
//! session/buffer/action/message vocabulary.

pub mod action;
pub mod api_call_log;
pub mod buffer;
pub mod coaching_message;
pub mod envelope;
pub mod review;
pub mod session;
pub mod tool_schema;

pub use action::Action;
pub use action::ActionType;
pub use api_call_log::ApiCallLogEntry;
pub use api_call_log::round_cost;
pub use buffer::Buffer;
pub use buffer::ChangeSignificance;
pub use buffer::classify_change;
pub use coaching_message::CoachingMessage;
pub use coaching_message::ExplanationEntry;
pub use coaching_message::NudgeTrigger;
pub use envelope::BufferUpdateRequest;
pub use envelope::ClientMessage;
pub use envelope::CoachingFeedback;
pub use envelope::ConnectionInit;
pub use envelope::Envelope;
pub use envelope::ErrorPayload;
pub use envelope::ExplainRequest;
pub use envelope::PlanningError;
pub use envelope::PlanningProgress;
pub use envelope::ServerHello;
pub use envelope::ServerMessage;
pub use envelope::error_message_for_kind;
pub use review::FindingSeverity;
pub use review::ReviewFinding;
pub use review::ReviewResult;
pub use session::Phase;
pub use session::PhaseStatus;
pub use session::PhaseStep;
pub use session::Plan;
pub use session::Session;
pub use session::SessionStatus;
pub use tool_schema::ToolCallRequest;
pub use tool_schema::ToolCallResult;
pub use tool_schema::ToolDefinition;
