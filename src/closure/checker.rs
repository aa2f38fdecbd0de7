use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::DbError,
    models::{ArchivableItem, Blocker},
    services::FileStorageError,
};

/// What one checker found when inspecting its subsystem.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub blockers: Vec<Blocker>,
    pub archivable: Vec<ArchivableItem>,
}

impl CheckReport {
    pub fn with_blocker(mut self, blocker: Blocker) -> Self {
        self.blockers.push(blocker);
        self
    }

    pub fn with_archivable(mut self, item: ArchivableItem) -> Self {
        self.archivable.push(item);
        self
    }
}

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Storage error: {0}")]
    Storage(#[from] FileStorageError),

    #[error("{0}")]
    Failed(String),
}

/// One subsystem's view of organization teardown.
///
/// Implementations own exactly one domain (wallet, projects, …) and are
/// registered with the orchestrator as a flat list; the orchestrator never
/// special-cases any of them.
#[async_trait]
pub trait ClosureChecker: Send + Sync {
    /// Stable identifier used in blockers, archived documents, and logs.
    fn module_id(&self) -> &'static str;

    /// Inspect the subsystem. Side-effect-free; called repeatedly and
    /// concurrently with other checkers.
    async fn check(&self, organization_id: Uuid) -> Result<CheckReport, CheckerError>;

    /// Snapshot the subsystem's data for the archive, returning the payload
    /// to persist (None when the subsystem archives nothing). Idempotent:
    /// safe to re-invoke after a partial failure.
    async fn archive(
        &self,
        organization_id: Uuid,
        archive_id: Uuid,
    ) -> Result<Option<serde_json::Value>, CheckerError>;

    /// Purge whatever `archive` covered. Idempotent; a no-op is valid.
    async fn delete_archived(&self, archive_id: Uuid) -> Result<(), CheckerError>;
}
