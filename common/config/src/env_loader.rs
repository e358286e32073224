//! Environment variable loading: one named `ENV_*` constant per
//! variable this crate reads, each with a documented default.

use std::env;
use std::path::PathBuf;

use paige_error::PaigeError;
use tracing::debug;
use tracing::warn;

use crate::types::Config;
use crate::types::ObserverConfig;
use crate::types::default_data_dir;

pub const ENV_PORT: &str = "PORT";
pub const ENV_PROJECT_DIR: &str = "PROJECT_DIR";
pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const ENV_MODEL_API_KEY: &str = "PAIGE_MODEL_API_KEY";

pub const ENV_COOLDOWN_MS: &str = "PAIGE_OBSERVER_COOLDOWN_MS";
pub const ENV_CONFIDENCE_THRESHOLD: &str = "PAIGE_OBSERVER_CONFIDENCE_THRESHOLD";
pub const ENV_FLOW_STATE_THRESHOLD: &str = "PAIGE_OBSERVER_FLOW_STATE_THRESHOLD";
pub const ENV_FLOW_STATE_WINDOW_MS: &str = "PAIGE_OBSERVER_FLOW_STATE_WINDOW_MS";
pub const ENV_BUFFER_UPDATE_TRIGGER_COUNT: &str = "PAIGE_OBSERVER_BUFFER_UPDATE_TRIGGER_COUNT";
pub const ENV_EXPLAIN_REQUEST_TRIGGER_COUNT: &str = "PAIGE_OBSERVER_EXPLAIN_REQUEST_TRIGGER_COUNT";

pub const ENV_BUFFER_SUMMARY_INTERVAL_MS: &str = "PAIGE_BUFFER_SUMMARY_INTERVAL_MS";
pub const ENV_SESSION_IDLE_MS: &str = "PAIGE_SESSION_IDLE_MS";
pub const ENV_MODEL_DEADLINE_SECS: &str = "PAIGE_MODEL_DEADLINE_SECS";

/// Load [`Config`] from the process environment.
///
/// `PROJECT_DIR` is required and must be an absolute, existing directory
/// (spec §6). Every other variable falls back to its documented default.
pub fn load_from_env() -> Result<Config, PaigeError> {
    let project_dir = read_project_dir()?;
    let mut config = Config::for_project(project_dir);

    config.port = read_parsed(ENV_PORT, config.port);
    if config.port == 0 {
        return Err(PaigeError::Validation {
            message: format!("{ENV_PORT} must be in 1..=65535"),
        });
    }

    if let Ok(dir) = env::var(ENV_DATA_DIR) {
        config.data_dir = PathBuf::from(dir);
    } else {
        config.data_dir = default_data_dir();
    }

    config.model_api_key = env::var(ENV_MODEL_API_KEY).ok().filter(|s| !s.is_empty());
    if config.model_api_key.is_none() {
        debug!("{ENV_MODEL_API_KEY} unset; model/memory features degrade to no-op");
    }

    config.observer = ObserverConfig {
        cooldown_ms: read_parsed(ENV_COOLDOWN_MS, config.observer.cooldown_ms),
        confidence_threshold: read_parsed(
            ENV_CONFIDENCE_THRESHOLD,
            config.observer.confidence_threshold,
        ),
        flow_state_threshold: read_parsed(
            ENV_FLOW_STATE_THRESHOLD,
            config.observer.flow_state_threshold,
        ),
        flow_state_window_ms: read_parsed(
            ENV_FLOW_STATE_WINDOW_MS,
            config.observer.flow_state_window_ms,
        ),
        buffer_update_trigger_count: read_parsed(
            ENV_BUFFER_UPDATE_TRIGGER_COUNT,
            config.observer.buffer_update_trigger_count,
        ),
        explain_request_trigger_count: read_parsed(
            ENV_EXPLAIN_REQUEST_TRIGGER_COUNT,
            config.observer.explain_request_trigger_count,
        ),
    };

    config.buffer_summary_interval_ms = read_parsed(
        ENV_BUFFER_SUMMARY_INTERVAL_MS,
        config.buffer_summary_interval_ms,
    );
    config.session_idle_ms = read_parsed(ENV_SESSION_IDLE_MS, config.session_idle_ms);
    config.model_call_deadline_secs =
        read_parsed(ENV_MODEL_DEADLINE_SECS, config.model_call_deadline_secs);

    Ok(config)
}

fn read_project_dir() -> Result<PathBuf, PaigeError> {
    let raw = env::var(ENV_PROJECT_DIR).map_err(|_| PaigeError::Validation {
        message: format!("{ENV_PROJECT_DIR} is required"),
    })?;
    let path = PathBuf::from(raw);
    if !path.is_absolute() {
        return Err(PaigeError::Validation {
            message: format!("{ENV_PROJECT_DIR} must be an absolute path"),
        });
    }
    if !path.is_dir() {
        return Err(PaigeError::Validation {
            message: format!("{ENV_PROJECT_DIR} does not exist or is not a directory"),
        });
    }
    Ok(path)
}

fn read_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{name} is not a valid value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_dir_errors() {
        // SAFETY: test runs single-threaded per process invocation for env vars it touches.
        unsafe {
            env::remove_var(ENV_PROJECT_DIR);
        }
        assert!(read_project_dir().is_err());
    }

    #[test]
    fn relative_project_dir_errors() {
        unsafe {
            env::set_var(ENV_PROJECT_DIR, "relative/path");
        }
        assert!(read_project_dir().is_err());
        unsafe {
            env::remove_var(ENV_PROJECT_DIR);
        }
    }
}
