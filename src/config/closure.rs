use serde::{Deserialize, Serialize};

/// Closure orchestration tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClosureConfig {
    /// Per-checker timeout for `check` calls during preview/initiate.
    /// A timed-out checker is reported as a blocking blocker.
    #[serde(default = "default_checker_timeout_secs")]
    pub checker_timeout_secs: u64,
}

impl Default for ClosureConfig {
    fn default() -> Self {
        Self {
            checker_timeout_secs: default_checker_timeout_secs(),
        }
    }
}

impl ClosureConfig {
    pub fn checker_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.checker_timeout_secs)
    }
}

fn default_checker_timeout_secs() -> u64 {
    10
}
