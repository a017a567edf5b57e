//! Local filesystem implementation of [`FileStore`].

use crate::traits::{FileStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs;

/// Local filesystem file store.
#[derive(Clone, Debug, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn move_file(&self, src: &Path, dst: &Path) -> StoreResult<()> {
        self.ensure_parent_dir(dst).await?;

        let start = std::time::Instant::now();

        // rename does not cross filesystem boundaries; fall back to
        // copy + remove when src and dst live on different devices.
        match fs::rename(src, dst).await {
            Ok(()) => {}
            Err(rename_err) => {
                fs::copy(src, dst).await.map_err(|e| {
                    StoreError::MoveFailed(format!(
                        "Failed to move {} to {}: rename: {}, copy: {}",
                        src.display(),
                        dst.display(),
                        rename_err,
                        e
                    ))
                })?;
                fs::remove_file(src).await.map_err(|e| {
                    StoreError::MoveFailed(format!(
                        "Failed to remove source {} after copy: {}",
                        src.display(),
                        e
                    ))
                })?;
            }
        }

        tracing::info!(
            src = %src.display(),
            dst = %dst.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File move successful"
        );

        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn remove(&self, path: &Path) -> StoreResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "File removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn list_dir(&self, dir: &Path) -> StoreResult<Vec<String>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::ListFailed(format!(
                    "Failed to list directory {}: {}",
                    dir.display(),
                    e
                )))
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StoreError::ListFailed(format!("Failed to list directory {}: {}", dir.display(), e))
        })? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}
