use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::SLUG_REGEX;

/// Lifecycle state of an organization.
///
/// Closure is a one-way machine: `Active → Closing → Closed`. `Archived` and
/// `Deleted` are terminal bookkeeping states set once the retention reaper
/// has purged the organization's archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    Active,
    Closing,
    Closed,
    Archived,
    Deleted,
}

impl OrganizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationStatus::Active => "active",
            OrganizationStatus::Closing => "closing",
            OrganizationStatus::Closed => "closed",
            OrganizationStatus::Archived => "archived",
            OrganizationStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(OrganizationStatus::Active),
            "closing" => Some(OrganizationStatus::Closing),
            "closed" => Some(OrganizationStatus::Closed),
            "archived" => Some(OrganizationStatus::Archived),
            "deleted" => Some(OrganizationStatus::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrganizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub slug: String,
    pub name: String,
    /// Key into the retention plan table; resolved by the plan resolver.
    pub plan: String,
    pub status: OrganizationStatus,
    pub closure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganization {
    pub owner_id: Uuid,
    /// URL-friendly identifier (lowercase alphanumeric with hyphens)
    #[validate(length(min = 1, max = 64), regex(path = *SLUG_REGEX))]
    pub slug: String,
    /// Display name
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Subscription plan key. Defaults to "free" when omitted.
    pub plan: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            OrganizationStatus::Active,
            OrganizationStatus::Closing,
            OrganizationStatus::Closed,
            OrganizationStatus::Archived,
            OrganizationStatus::Deleted,
        ] {
            assert_eq!(OrganizationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrganizationStatus::parse("bogus"), None);
    }
}
