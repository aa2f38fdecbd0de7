mod archives;
mod common;
mod file_trash;
mod files;
mod organizations;
mod projects;
mod vacancies;
mod wallets;

pub use archives::SqliteArchiveRepo;
pub use file_trash::SqliteFileTrashRepo;
pub use files::SqliteFileRepo;
pub use organizations::SqliteOrganizationRepo;
pub use projects::SqliteProjectRepo;
pub use vacancies::SqliteVacancyRepo;
pub use wallets::SqliteWalletRepo;
