//! Retention window configuration.
//!
//! Retention is resolved per organization from its subscription plan. Plans
//! not listed here fall back to `default_plan`.
//!
//! # Example
//!
//! ```toml
//! [retention]
//! notify_window_days = 7
//!
//! [retention.default_plan]
//! archive_days = 30
//! trash_days = 30
//!
//! [retention.plans.pro]
//! archive_days = 90
//! trash_days = 60
//!
//! [retention.plans.enterprise]
//! archive_days = 365
//! trash_days = 0          # 0 = infinite trash retention
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Retention windows for one subscription plan.
///
/// Day counts of 0 mean "keep forever": an archive window of 0 is rejected
/// (archives must eventually expire), a trash window of 0 grants infinite
/// trash retention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanRetention {
    /// Days a closed organization's archive survives before purge.
    #[serde(default = "default_archive_days")]
    pub archive_days: u32,

    /// Days a trashed file survives before purge. 0 = infinite.
    #[serde(default = "default_trash_days")]
    pub trash_days: u32,
}

impl Default for PlanRetention {
    fn default() -> Self {
        Self {
            archive_days: default_archive_days(),
            trash_days: default_trash_days(),
        }
    }
}

fn default_archive_days() -> u32 {
    30
}

fn default_trash_days() -> u32 {
    30
}

/// Retention configuration: plan table plus the notification window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// How many days before archive expiry the owner is warned.
    #[serde(default = "default_notify_window_days")]
    pub notify_window_days: u32,

    /// Fallback retention for organizations on unlisted plans.
    #[serde(default)]
    pub default_plan: PlanRetention,

    /// Per-plan overrides, keyed by the organization's `plan` field.
    #[serde(default)]
    pub plans: HashMap<String, PlanRetention>,
}

fn default_notify_window_days() -> u32 {
    7
}

impl RetentionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_plan.archive_days == 0 {
            return Err(ConfigError::Validation(
                "retention.default_plan.archive_days must be at least 1".into(),
            ));
        }
        for (name, plan) in &self.plans {
            if plan.archive_days == 0 {
                return Err(ConfigError::Validation(format!(
                    "retention.plans.{}.archive_days must be at least 1",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Retention windows for the given plan key, falling back to the default.
    pub fn for_plan(&self, plan: &str) -> PlanRetention {
        self.plans.get(plan).copied().unwrap_or(self.default_plan)
    }
}
