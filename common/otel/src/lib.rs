//! Logging setup for the paige process.
//!
//! A single entry point, [`init_tracing`], wires `tracing-subscriber` with
//! an `EnvFilter` driven by `PAIGE_LOG` (default `info`). Every other crate
//! logs through the `tracing` macros; this crate owns only the subscriber
//! wiring so it can be swapped (e.g. for a JSON formatter in production)
//! without touching call sites.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Default filter directive when `PAIGE_LOG` is unset.
pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once in tests; subsequent calls are no-ops
/// (errors from `try_init` are swallowed since a subscriber may already be
/// installed by a parent test harness).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("PAIGE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
