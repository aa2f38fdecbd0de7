//! Configuration module.
//!
//! The service is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! environment = "production"
//! cron_secret = "${CRON_SECRET}"
//!
//! [database]
//! path = "./data/atrium.db"
//! ```

mod closure;
mod database;
mod observability;
mod retention;
mod server;
mod storage;
mod workers;

use std::path::{Path, PathBuf};

pub use closure::*;
pub use database::*;
pub use observability::*;
pub use retention::*;
use serde::{Deserialize, Serialize};
pub use server::*;
pub use storage::*;
use thiserror::Error;
pub use workers::*;

/// Root configuration for the service. All sections are optional with
/// sensible defaults except the database path.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AtriumConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// File blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Retention windows per subscription plan.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Background worker loops (reaper jobs).
    #[serde(default)]
    pub workers: WorkersConfig,

    /// Closure orchestration tuning.
    #[serde(default)]
    pub closure: ClosureConfig,

    /// Observability configuration (logging).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing environment variable '{0}' referenced in config")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl AtriumConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: AtriumConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.environment.is_production() && self.server.cron_secret.is_none() {
            tracing::warn!(
                "No cron_secret configured — cron endpoints will refuse all requests. \
                 Set server.cron_secret for scheduled jobs to run."
            );
        }
        self.database.validate()?;
        self.retention.validate()?;
        self.workers.validate()?;
        Ok(())
    }
}

/// Expand `${VAR_NAME}` references against the process environment.
///
/// A reference to an unset variable is an error rather than an empty string,
/// so misconfigured deployments fail at startup instead of at 3am.
fn expand_env_vars(contents: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex");
    let mut missing = None;

    let expanded = re.replace_all(contents, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(ConfigError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}

/// Default configuration file contents written by `atrium init`.
pub fn default_config_toml() -> &'static str {
    r#"# Atrium configuration.
# Values of the form ${VAR} are expanded from the environment at startup.

[server]
host = "127.0.0.1"
port = 8080
environment = "development"
# cron_secret = "${CRON_SECRET}"

[database]
path = "./data/atrium.db"

[storage]
files_root = "./data/files"

[retention]
notify_window_days = 7

[retention.default_plan]
archive_days = 30
trash_days = 30

# [retention.plans.pro]
# archive_days = 90
# trash_days = 60

[workers]
enabled = true
notify_interval_hours = 6
cleanup_interval_hours = 12
trash_interval_hours = 12
batch_size = 100
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = AtriumConfig::from_toml(default_config_toml()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.environment.is_production());
        assert_eq!(config.database.path, "./data/atrium.db");
        assert!(config.workers.enabled);
    }

    #[test]
    fn env_vars_are_expanded() {
        // SAFETY: test-local variable name, no concurrent reader cares.
        unsafe { std::env::set_var("ATRIUM_TEST_SECRET", "s3cret") };
        let config = AtriumConfig::from_toml(
            r#"
            [server]
            cron_secret = "${ATRIUM_TEST_SECRET}"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.cron_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn missing_env_var_is_an_error() {
        let result = AtriumConfig::from_toml(
            r#"
            [server]
            cron_secret = "${ATRIUM_DEFINITELY_UNSET_VAR}"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = AtriumConfig::from_toml(
            r#"
            [server]
            prot = 8080
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
