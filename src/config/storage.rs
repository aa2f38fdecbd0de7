use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory for file blobs on the local filesystem.
    #[serde(default = "default_files_root")]
    pub files_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            files_root: default_files_root(),
        }
    }
}

fn default_files_root() -> PathBuf {
    PathBuf::from("./data/files")
}
