//! Blob storage backend for file content.
//!
//! The trait keeps the seam the platform's other backends (object storage)
//! plug into; this crate ships the filesystem implementation the reaper and
//! the files checker exercise.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

pub type FileStorageResult<T> = Result<T, FileStorageError>;

/// Storage backend for file blobs, keyed by the `storage_path` recorded on
/// the file row.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Store content under the given path, creating parent directories.
    async fn store(&self, storage_path: &str, content: &[u8]) -> FileStorageResult<()>;

    /// Delete the blob. Deleting a blob that is already gone is a no-op:
    /// the reaper retries failed purges and must be able to re-run.
    async fn delete(&self, storage_path: &str) -> FileStorageResult<()>;

    /// Whether a blob exists (used by health/debug surfaces and tests).
    async fn exists(&self, storage_path: &str) -> FileStorageResult<bool>;
}

/// Filesystem-backed storage rooted at a configured directory.
pub struct FilesystemFileStorage {
    root: PathBuf,
}

impl FilesystemFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a storage path inside the root, rejecting traversal.
    fn resolve(&self, storage_path: &str) -> FileStorageResult<PathBuf> {
        let relative = Path::new(storage_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(FileStorageError::InvalidPath(storage_path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for FilesystemFileStorage {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn store(&self, storage_path: &str, content: &[u8]) -> FileStorageResult<()> {
        let path = self.resolve(storage_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    async fn delete(&self, storage_path: &str) -> FileStorageResult<()> {
        let path = self.resolve(storage_path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, storage_path: &str) -> FileStorageResult<bool> {
        let path = self.resolve(storage_path)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemFileStorage::new(dir.path());

        storage.store("org-1/report.pdf", b"content").await.unwrap();
        assert!(storage.exists("org-1/report.pdf").await.unwrap());

        storage.delete("org-1/report.pdf").await.unwrap();
        assert!(!storage.exists("org-1/report.pdf").await.unwrap());

        // Deleting again is a no-op, not an error.
        storage.delete("org-1/report.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemFileStorage::new(dir.path());

        let result = storage.store("../outside", b"x").await;
        assert!(matches!(result, Err(FileStorageError::InvalidPath(_))));
    }
}
