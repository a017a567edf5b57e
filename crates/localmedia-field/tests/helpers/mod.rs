//! Shared fixtures for field integration tests.

use async_trait::async_trait;
use localmedia_core::attachment::Attachment;
use localmedia_core::derivative::ResampleOp;
use localmedia_core::hooks::{PostMoveHook, PreMoveHook};
use localmedia_core::record::RecordHandle;
use localmedia_core::resize::Resizer;
use localmedia_core::upload::UploadRequest;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Write an upload fixture file and return its request descriptor.
pub async fn spool_upload(dir: &Path, name: &str, content_type: &str, data: &[u8]) -> UploadRequest {
    let temp_path = dir.join(format!("incoming-{}", name));
    tokio::fs::write(&temp_path, data).await.unwrap();
    UploadRequest {
        temp_path,
        original_name: name.to_string(),
        size: data.len() as u64,
        content_type: content_type.to_string(),
    }
}

/// An upload whose temp file does not exist, so the move step fails.
pub fn missing_upload(dir: &Path, name: &str) -> UploadRequest {
    UploadRequest {
        temp_path: dir.join(format!("missing-{}", name)),
        original_name: name.to_string(),
        size: 1,
        content_type: "image/jpeg".to_string(),
    }
}

/// Resizer that records calls and writes a marker file per derivative.
#[derive(Default)]
pub struct RecordingResizer {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl RecordingResizer {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resizer for RecordingResizer {
    async fn resize(
        &self,
        _op: ResampleOp,
        _src: &Path,
        dst: &Path,
        _width: u32,
        _height: u32,
    ) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("resize unavailable");
        }
        tokio::fs::write(dst, b"derivative").await?;
        Ok(())
    }
}

/// Pre-move hook that counts invocations and optionally vetoes the upload.
#[derive(Default)]
pub struct CountingPreHook {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl CountingPreHook {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreMoveHook for CountingPreHook {
    async fn run(&self, _record: &RecordHandle, _upload: &UploadRequest) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("upload vetoed");
        }
        Ok(())
    }
}

/// Post-move hook that captures the finalized attachments it sees.
#[derive(Default)]
pub struct CapturingPostHook {
    pub seen: Mutex<Vec<Attachment>>,
}

impl CapturingPostHook {
    pub fn seen_paths(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().iter().map(|a| a.file_path()).collect()
    }
}

#[async_trait]
impl PostMoveHook for CapturingPostHook {
    async fn run(
        &self,
        _record: &RecordHandle,
        _upload: &UploadRequest,
        attachment: &Attachment,
    ) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push(attachment.clone());
        Ok(())
    }
}
