use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a retention archive.
///
/// `Active` archives are waiting out their retention window. The cleaner
/// claims a due archive by moving it to `Expired` before purging, so
/// overlapping reaper runs cannot purge the same archive twice; a purge that
/// failed part-way stays `Expired` and is retried on the next pass.
/// `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveStatus {
    Active,
    Expired,
    Deleted,
}

impl ArchiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveStatus::Active => "active",
            ArchiveStatus::Expired => "expired",
            ArchiveStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ArchiveStatus::Active),
            "expired" => Some(ArchiveStatus::Expired),
            "deleted" => Some(ArchiveStatus::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArchiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The durable saga log for one organization teardown: created atomically
/// with the `closing → closed` transition, purged by the reaper after
/// `expires_at`. At most one active archive exists per organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationArchive {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub owner_id: Uuid,
    pub status: ArchiveStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// When the owner was last warned about the upcoming purge.
    /// Idempotency marker: one notification per archive per UTC calendar day.
    pub notified_at: Option<DateTime<Utc>>,
}

/// One checker's serialized snapshot, tied to an archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedDocument {
    pub id: Uuid,
    pub archive_id: Uuid,
    pub source_module_id: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewArchivedDocument {
    pub archive_id: Uuid,
    pub source_module_id: String,
    pub payload: serde_json::Value,
}
