mod archives;
mod file_trash;
mod files;
mod organizations;
mod projects;
mod vacancies;
mod wallets;

pub use archives::*;
pub use file_trash::*;
pub use files::*;
pub use organizations::*;
pub use projects::*;
pub use vacancies::*;
pub use wallets::*;
