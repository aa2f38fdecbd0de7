use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A file owned by an organization. `deleted_at` is the soft-delete marker:
/// set when the file is trashed, cleared again on restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub uploaded_by: Uuid,
    pub filename: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StoredFile {
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFile {
    pub organization_id: Uuid,
    pub uploaded_by: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    pub size_bytes: i64,
    pub storage_path: String,
}
