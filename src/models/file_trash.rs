use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tombstone for a soft-deleted file.
///
/// `expires_at = None` means infinite retention: the entry is never purged.
/// Once `restored_at` is set the entry is permanently excluded from purge,
/// even if it was already due.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTrashEntry {
    pub file_id: Uuid,
    pub organization_id: Uuid,
    pub deleted_by: Uuid,
    pub deleted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Retention granted at trash time, recorded for display. None when the
    /// plan grants infinite retention.
    pub retention_days: Option<i64>,
    pub restored_at: Option<DateTime<Utc>>,
}

impl FileTrashEntry {
    /// Whether the reaper is allowed to purge this entry at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.restored_at.is_none() && self.expires_at.is_some_and(|e| e < now)
    }
}
