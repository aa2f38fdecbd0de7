//! Subscription-plan lookup, reduced to the retention windows this engine
//! consumes. The billing subsystem owns the real plan catalog; closure only
//! needs to know how long a given plan keeps archives and trashed files.

use chrono::Duration;

use crate::config::{PlanRetention, RetentionConfig};

/// Resolves retention windows from an organization's plan key.
#[derive(Clone)]
pub struct PlanResolver {
    config: RetentionConfig,
}

impl PlanResolver {
    pub fn new(config: RetentionConfig) -> Self {
        Self { config }
    }

    fn plan(&self, plan: &str) -> PlanRetention {
        self.config.for_plan(plan)
    }

    /// How long a closed organization's archive survives before purge.
    pub fn archive_retention(&self, plan: &str) -> Duration {
        Duration::days(i64::from(self.plan(plan).archive_days))
    }

    /// How long a trashed file survives before purge. `None` = infinite.
    pub fn trash_retention(&self, plan: &str) -> Option<Duration> {
        match self.plan(plan).trash_days {
            0 => None,
            days => Some(Duration::days(i64::from(days))),
        }
    }

    /// How many days before archive expiry the owner is warned.
    pub fn notify_window(&self) -> Duration {
        Duration::days(i64::from(self.config.notify_window_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PlanResolver {
        let config: RetentionConfig = toml::from_str(
            r#"
            notify_window_days = 7

            [default_plan]
            archive_days = 30
            trash_days = 30

            [plans.enterprise]
            archive_days = 365
            trash_days = 0
            "#,
        )
        .unwrap();
        PlanResolver::new(config)
    }

    #[test]
    fn known_plan_resolves() {
        let r = resolver();
        assert_eq!(r.archive_retention("enterprise"), Duration::days(365));
        assert_eq!(r.trash_retention("enterprise"), None);
    }

    #[test]
    fn unknown_plan_falls_back() {
        let r = resolver();
        assert_eq!(r.archive_retention("starter"), Duration::days(30));
        assert_eq!(r.trash_retention("starter"), Some(Duration::days(30)));
    }
}
