//! Filesystem abstraction trait.
//!
//! The orchestrators consume these primitives instead of touching the
//! filesystem directly, so tests and alternative backends can stand in.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Filesystem operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Move failed: {0}")]
    MoveFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for filesystem operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Filesystem primitives used by the upload pipeline.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Relocate `src` to `dst`, creating `dst`'s parent directory when
    /// missing. Must be cross-device safe.
    async fn move_file(&self, src: &Path, dst: &Path) -> StoreResult<()>;

    /// Whether a path currently exists.
    async fn exists(&self, path: &Path) -> bool;

    /// Remove a file. Removing an already-absent file is success.
    async fn remove(&self, path: &Path) -> StoreResult<()>;

    /// Entry names in a directory. An absent directory lists as empty.
    async fn list_dir(&self, dir: &Path) -> StoreResult<Vec<String>>;
}
