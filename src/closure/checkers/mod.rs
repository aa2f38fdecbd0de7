mod files;
mod projects;
mod vacancies;
mod wallet;

use std::sync::Arc;

pub use files::FilesChecker;
pub use projects::ProjectsChecker;
pub use vacancies::VacanciesChecker;
pub use wallet::WalletChecker;

use super::ClosureChecker;
use crate::{db::DbPool, services::FileStorage};

/// The platform's standard checker set, in fixed registration order.
/// Order is load-bearing only for log/test reproducibility; checkers are
/// logically independent.
pub fn default_checkers(
    db: Arc<DbPool>,
    storage: Arc<dyn FileStorage>,
) -> Vec<Arc<dyn ClosureChecker>> {
    vec![
        Arc::new(WalletChecker::new(db.clone())),
        Arc::new(ProjectsChecker::new(db.clone())),
        Arc::new(VacanciesChecker::new(db.clone())),
        Arc::new(FilesChecker::new(db, storage)),
    ]
}
