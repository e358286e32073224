//! Environment-driven configuration for the paige process (spec §6, §4.8).

mod env_loader;
mod types;

pub use env_loader::load_from_env;
pub use types::Config;
pub use types::ObserverConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::for_project(dir.path().to_path_buf());
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.observer.cooldown_ms, 120_000);
        assert_eq!(cfg.observer.confidence_threshold, 0.7);
        assert!(cfg.model_api_key.is_none());
        assert_eq!(cfg.project_dir, dir.path().to_path_buf());
    }
}
