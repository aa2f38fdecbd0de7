mod error;
pub mod repos;
pub mod sqlite;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    organizations: Arc<dyn OrganizationRepo>,
    archives: Arc<dyn ArchiveRepo>,
    files: Arc<dyn FileRepo>,
    file_trash: Arc<dyn FileTrashRepo>,
    projects: Arc<dyn ProjectRepo>,
    vacancies: Arc<dyn VacancyRepo>,
    wallets: Arc<dyn WalletRepo>,
}

impl CachedRepos {
    fn from_pool(pool: &sqlx::SqlitePool) -> Self {
        Self {
            organizations: Arc::new(sqlite::SqliteOrganizationRepo::new(pool.clone())),
            archives: Arc::new(sqlite::SqliteArchiveRepo::new(pool.clone())),
            files: Arc::new(sqlite::SqliteFileRepo::new(pool.clone())),
            file_trash: Arc::new(sqlite::SqliteFileTrashRepo::new(pool.clone())),
            projects: Arc::new(sqlite::SqliteProjectRepo::new(pool.clone())),
            vacancies: Arc::new(sqlite::SqliteVacancyRepo::new(pool.clone())),
            wallets: Arc::new(sqlite::SqliteWalletRepo::new(pool.clone())),
        }
    }
}

/// Database pool with repositories cached at construction time to avoid
/// allocation on each access.
pub struct DbPool {
    inner: sqlx::SqlitePool,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos::from_pool(&pool);
        DbPool { inner: pool, repos }
    }

    /// Create a database pool from configuration.
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        // SQLite creates the database file but not its parent directory.
        if config.create_if_missing
            && let Some(parent) = std::path::Path::new(&config.path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| DbError::Internal(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(
                sqlx::sqlite::SqliteConnectOptions::new()
                    .filename(&config.path)
                    .create_if_missing(config.create_if_missing)
                    .journal_mode(if config.wal_mode {
                        sqlx::sqlite::SqliteJournalMode::Wal
                    } else {
                        sqlx::sqlite::SqliteJournalMode::Delete
                    })
                    .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms)),
            )
            .await?;

        Ok(Self::from_sqlite(pool))
    }

    /// Run database migrations using sqlx's migration runner.
    /// This automatically creates and manages a _sqlx_migrations table.
    pub async fn run_migrations(&self) -> DbResult<()> {
        tracing::info!("Running SQLite migrations");
        sqlx::migrate!("./migrations_sqlx/sqlite")
            .run(&self.inner)
            .await?;
        tracing::info!("SQLite migrations completed successfully");
        Ok(())
    }

    pub fn organizations(&self) -> Arc<dyn OrganizationRepo> {
        Arc::clone(&self.repos.organizations)
    }

    pub fn archives(&self) -> Arc<dyn ArchiveRepo> {
        Arc::clone(&self.repos.archives)
    }

    pub fn files(&self) -> Arc<dyn FileRepo> {
        Arc::clone(&self.repos.files)
    }

    pub fn file_trash(&self) -> Arc<dyn FileTrashRepo> {
        Arc::clone(&self.repos.file_trash)
    }

    pub fn projects(&self) -> Arc<dyn ProjectRepo> {
        Arc::clone(&self.repos.projects)
    }

    pub fn vacancies(&self) -> Arc<dyn VacancyRepo> {
        Arc::clone(&self.repos.vacancies)
    }

    pub fn wallets(&self) -> Arc<dyn WalletRepo> {
        Arc::clone(&self.repos.wallets)
    }

    /// Health check for database connectivity.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.inner).await?;
        Ok(())
    }
}
