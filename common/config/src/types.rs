use std::path::PathBuf;

/// Tunables for the Observer's suppression rules (spec §4.8).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverConfig {
    /// Minimum time between delivered nudges.
    pub cooldown_ms: u64,
    /// Minimum classifier confidence to deliver a nudge.
    pub confidence_threshold: f64,
    /// Number of recent user-initiated actions within the window that
    /// indicates flow state (triage is skipped).
    pub flow_state_threshold: usize,
    /// Width of the flow-state ring-buffer window.
    pub flow_state_window_ms: u64,
    /// Number of buffer-update actions before triage is triggered.
    pub buffer_update_trigger_count: u32,
    /// Number of explain-request actions before triage is triggered.
    pub explain_request_trigger_count: u32,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 120_000,
            confidence_threshold: 0.7,
            flow_state_threshold: 10,
            flow_state_window_ms: 60_000,
            buffer_update_trigger_count: 5,
            explain_request_trigger_count: 3,
        }
    }
}

/// Process-wide configuration, loaded once at startup (spec §6).
#[derive(Debug, Clone)]
pub struct Config {
    /// UI message hub listen port. 1-65535, default 3001.
    pub port: u16,
    /// Absolute, existing workspace directory the tool surface is confined to.
    pub project_dir: PathBuf,
    /// Directory for the SQLite action/api-call log and other local state.
    pub data_dir: PathBuf,
    /// External model provider API key. When absent, `ModelClient` and
    /// `MemoryStore` degrade to no-op implementations (spec §6).
    pub model_api_key: Option<String>,
    /// Observer suppression-rule tunables.
    pub observer: ObserverConfig,
    /// Buffer cache periodic summary interval (spec §4.2, default 30s).
    pub buffer_summary_interval_ms: u64,
    /// Idle interval before a session auto-cancels (spec §4.6).
    pub session_idle_ms: u64,
    /// Default deadline for a single model call (spec §5).
    pub model_call_deadline_secs: u64,
}

impl Config {
    /// Build a `Config` with defaults for everything except `project_dir`.
    /// Used by tests and by [`super::load_from_env`] once the required
    /// variable has been resolved.
    pub fn for_project(project_dir: PathBuf) -> Self {
        Self {
            port: 3001,
            project_dir,
            data_dir: default_data_dir(),
            model_api_key: None,
            observer: ObserverConfig::default(),
            buffer_summary_interval_ms: 30_000,
            session_idle_ms: 900_000,
            model_call_deadline_secs: 60,
        }
    }
}

pub(crate) fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".paige")
}
