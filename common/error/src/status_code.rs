//! Status-code classification for [`crate::PaigeError`].
//!
//! Every error raised anywhere in the workspace is tagged with one of the
//! categories below. The categories mirror spec §7's error kinds
//! (Validation, Session, Filesystem, Model, Observer) plus an `Internal`
//! catch-all for invariant violations that should never surface to a
//! caller in practice.

use strum::AsRefStr;
use strum::EnumIter;

/// Coarse-grained error category, used to decide how a caller should react
/// (disconnect vs. reply with an error frame, retry vs. give up, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum StatusCategory {
    /// Malformed input: bad envelope, unknown message type, schema mismatch.
    Validation,
    /// Session lifecycle violations: `SessionAlreadyActive`, `NoActiveSession`.
    Session,
    /// Path validation / file access failures.
    Filesystem,
    /// Errors from the external model client: refusal, overflow, timeout.
    Model,
    /// Observer classifier failures (always caught and logged, never fatal).
    Observer,
    /// Anything else — a bug or an unreachable state.
    Internal,
}

impl StatusCategory {
    /// Whether an operation in this category is generally safe to retry.
    pub const fn retryable(self) -> bool {
        matches!(self, Self::Model | Self::Observer)
    }

    /// Whether this category warrants an `error!`-level log by default.
    pub const fn log_error(self) -> bool {
        !matches!(self, Self::Observer)
    }
}
