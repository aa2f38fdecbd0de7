mod archive;
mod closure;
mod file;
mod file_trash;
mod organization;
mod project;
mod vacancy;
mod validators;
mod wallet;

pub use archive::*;
pub use closure::*;
pub use file::*;
pub use file_trash::*;
pub use organization::*;
pub use project::*;
pub use vacancy::*;
pub use wallet::*;
