//! Ambient configuration, read once at process startup.
//! Reads overrides from the environment with an env-var-with-fallback
//! idiom, falling back to documented defaults when unset or unparseable.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub params_path: PathBuf,
    pub params_poll_interval: Duration,
    pub audit_enabled: bool,
    pub audit_path: PathBuf,
    pub history_capacity: usize,
    pub recent_trades_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            params_path: PathBuf::from("watch_bot_analyzer/output/params_latest.json"),
            params_poll_interval: Duration::from_millis(3000),
            audit_enabled: false,
            audit_path: PathBuf::from("logs/parity_debug.jsonl"),
            history_capacity: 1000,
            recent_trades_capacity: 100,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        let params_path = std::env::var("PARAMS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.params_path);

        let params_poll_interval = std::env::var("PARAMS_POLL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.params_poll_interval);

        let audit_enabled = std::env::var("AUDIT_ENABLED")
            .ok()
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(defaults.audit_enabled);

        let audit_path = std::env::var("AUDIT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.audit_path);

        let history_capacity = std::env::var("HISTORY_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.history_capacity);

        let recent_trades_capacity = std::env::var("RECENT_TRADES_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.recent_trades_capacity);

        Self {
            params_path,
            params_poll_interval,
            audit_enabled,
            audit_path,
            history_capacity,
            recent_trades_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = CoreConfig::default();
        assert_eq!(config.params_poll_interval, Duration::from_millis(3000));
        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.recent_trades_capacity, 100);
        assert!(!config.audit_enabled);
    }
}
