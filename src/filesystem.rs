//! Filesystem collaborator: directory creation and whole-file writes.

use std::path::Path;

use crate::error::{Error, Result};

/// Abstraction over the filesystem operations the pipeline needs.
#[async_trait::async_trait]
pub trait Filesystem: Send + Sync {
    /// Create `path` and all missing parents
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Create or truncate `path` and write `contents` to it
    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

/// Production [`Filesystem`] over `tokio::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFilesystem;

#[async_trait::async_trait]
impl Filesystem for OsFilesystem {
    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| Error::filesystem(path, e))
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| Error::filesystem(path, e))
    }
}
