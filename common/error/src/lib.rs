//! Unified error type for the paige workspace.
//!
//! All crates return `Result<T, PaigeError>` (or a crate-local error that
//! converts into it) from their public APIs. Each variant carries a
//! [`StatusCategory`] so callers can classify failures without matching on
//! every concrete variant — see spec §7 (Error Handling Design).

mod status_code;

pub use status_code::StatusCategory;
use std::path::PathBuf;

/// The workspace-wide error type.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub))]
pub enum PaigeError {
    /// Malformed UI message envelope, unknown type, or schema mismatch.
    #[snafu(display("invalid message: {message}"))]
    Validation { message: String },

    /// A second session was started while one was already active.
    #[snafu(display("a session is already active"))]
    SessionAlreadyActive,

    /// An operation required an active session but none exists.
    #[snafu(display("no active session"))]
    NoActiveSession,

    /// A session id did not resolve to a known session.
    #[snafu(display("unknown session: {session_id}"))]
    UnknownSession { session_id: u64 },

    /// A path resolved outside the project root (`..`, absolute escape,
    /// or a symlink target escaping root).
    #[snafu(display("path escapes project root: {}", path.display()))]
    PathEscapesRoot { path: PathBuf },

    /// A path contained a NUL byte or was empty.
    #[snafu(display("invalid path"))]
    InvalidPath,

    /// The requested file does not exist.
    #[snafu(display("file not found: {}", path.display()))]
    FileNotFound { path: PathBuf },

    /// The model refused to answer.
    #[snafu(display("model refused the request"))]
    ModelRefusal,

    /// The model hit its output token budget before finishing.
    #[snafu(display("model response truncated at max_tokens"))]
    ModelMaxTokens,

    /// The model call exceeded its deadline.
    #[snafu(display("model call timed out"))]
    ModelTimeout,

    /// Transport-level failure calling the model provider.
    #[snafu(display("model transport error: {message}"))]
    ModelTransport { message: String },

    /// The model's response did not parse against the expected schema.
    #[snafu(display("model response failed schema validation: {message}"))]
    ModelSchema { message: String },

    /// A review-agent or coaching-pipeline loop exceeded its turn budget.
    #[snafu(display("{what} exceeded maximum turns"))]
    MaxTurnsExceeded { what: String },

    /// Underlying storage (SQLite) failure.
    #[snafu(display("storage error: {message}"))]
    Storage { message: String },

    /// Anything else — an invariant violation that should be unreachable.
    #[snafu(display("internal error: {message}"))]
    Internal { message: String },

    /// The session ended while a best-effort coaching pipeline stage
    /// (e.g. Plan) was still in flight (spec §5).
    #[snafu(display("session ended before this stage finished"))]
    SessionCancelled,
}

impl PaigeError {
    /// Classify this error for logging / retry decisions.
    pub const fn category(&self) -> StatusCategory {
        match self {
            Self::Validation { .. } => StatusCategory::Validation,
            Self::SessionAlreadyActive | Self::NoActiveSession | Self::UnknownSession { .. } => {
                StatusCategory::Session
            }
            Self::PathEscapesRoot { .. } | Self::InvalidPath | Self::FileNotFound { .. } => {
                StatusCategory::Filesystem
            }
            Self::ModelRefusal
            | Self::ModelMaxTokens
            | Self::ModelTimeout
            | Self::ModelTransport { .. }
            | Self::ModelSchema { .. } => StatusCategory::Model,
            Self::MaxTurnsExceeded { .. } => StatusCategory::Internal,
            Self::Storage { .. } | Self::Internal { .. } => StatusCategory::Internal,
            Self::SessionCancelled => StatusCategory::Session,
        }
    }

    /// Whether the originating operation is generally safe to retry.
    pub fn retryable(&self) -> bool {
        self.category().retryable()
    }

    /// Build the `error:file_not_found | error:permission_denied | error:general`
    /// discriminant spec §6 expects the UI message hub to broadcast for this
    /// error.
    pub fn ui_error_kind(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "file_not_found",
            Self::PathEscapesRoot { .. } | Self::InvalidPath => "permission_denied",
            _ => "general",
        }
    }
}

pub type Result<T, E = PaigeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_session_errors() {
        assert_eq!(
            PaigeError::SessionAlreadyActive.category(),
            StatusCategory::Session
        );
        assert_eq!(
            PaigeError::NoActiveSession.category(),
            StatusCategory::Session
        );
    }

    #[test]
    fn filesystem_errors_map_to_ui_kinds() {
        let escapes = PaigeError::PathEscapesRoot {
            path: PathBuf::from("/etc/passwd"),
        };
        assert_eq!(escapes.ui_error_kind(), "permission_denied");

        let missing = PaigeError::FileNotFound {
            path: PathBuf::from("foo.rs"),
        };
        assert_eq!(missing.ui_error_kind(), "file_not_found");
    }

    #[test]
    fn model_errors_are_retryable() {
        assert!(PaigeError::ModelTimeout.retryable());
        assert!(!PaigeError::SessionAlreadyActive.retryable());
    }
}
