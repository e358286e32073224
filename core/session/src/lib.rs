//! Session lifecycle registry (spec §4.6): start/restore/end, the
//! at-most-one-active-session invariant, and idle auto-timeout.

mod registry;

pub use registry::EndReason;
pub use registry::SessionRegistry;
