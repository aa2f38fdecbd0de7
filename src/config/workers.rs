//! Background worker (reaper loop) configuration.
//!
//! The same passes are reachable through the /cron endpoints for deployments
//! that prefer an external scheduler; the built-in loops exist for
//! single-node installs.

use serde::{Deserialize, Serialize};

use super::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkersConfig {
    /// Whether the in-process worker loops run at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// How often the expiry notifier runs (in hours).
    #[serde(default = "default_notify_interval_hours")]
    pub notify_interval_hours: u64,

    /// How often the archive cleaner runs (in hours).
    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u64,

    /// How often the file-trash reaper runs (in hours).
    #[serde(default = "default_trash_interval_hours")]
    pub trash_interval_hours: u64,

    /// Maximum rows each pass processes.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            notify_interval_hours: default_notify_interval_hours(),
            cleanup_interval_hours: default_cleanup_interval_hours(),
            trash_interval_hours: default_trash_interval_hours(),
            batch_size: default_batch_size(),
        }
    }
}

impl WorkersConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size <= 0 {
            return Err(ConfigError::Validation(
                "workers.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn notify_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.notify_interval_hours * 3600)
    }

    pub fn cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cleanup_interval_hours * 3600)
    }

    pub fn trash_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.trash_interval_hours * 3600)
    }
}

fn default_true() -> bool {
    true
}

fn default_notify_interval_hours() -> u64 {
    6
}

fn default_cleanup_interval_hours() -> u64 {
    12
}

fn default_trash_interval_hours() -> u64 {
    12
}

fn default_batch_size() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config: WorkersConfig = toml::from_str("enabled = false").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.notify_interval_hours, 6);
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn interval_durations() {
        let config = WorkersConfig::default();
        assert_eq!(
            config.cleanup_interval(),
            std::time::Duration::from_secs(12 * 3600)
        );
    }

    #[test]
    fn zero_batch_size_rejected() {
        let config: WorkersConfig = toml::from_str("batch_size = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
