mod file_storage;
mod file_trash;
mod notifications;
mod plans;

use std::sync::Arc;

pub use file_storage::{FileStorage, FileStorageError, FileStorageResult, FilesystemFileStorage};
pub use file_trash::{FileTrashError, FileTrashResult, FileTrashService};
pub use notifications::{ArchiveExpiryNotice, EventBusNotifier, Notifier, NotifyError};
pub use plans::PlanResolver;

use crate::db::DbPool;

/// Container for all services.
#[derive(Clone)]
pub struct Services {
    pub plans: PlanResolver,
    pub file_trash: FileTrashService,
}

impl Services {
    pub fn new(db: Arc<DbPool>, plans: PlanResolver) -> Self {
        Self {
            file_trash: FileTrashService::new(db, plans.clone()),
            plans,
        }
    }
}
