//! Hook stages and the sequential chain runner.
//!
//! A field exposes two extension points: `pre.move`, run before the incoming
//! file is relocated, and `post.move`, run after relocation and metadata
//! update with the finalized attachment. Callbacks run strictly in
//! registration order, one at a time; the first failure aborts the chain.
//! Hooks observe the record through its handle but the orchestrator stays
//! the sole writer of attachment metadata.

use crate::attachment::Attachment;
use crate::error::{FieldError, FieldResult};
use crate::record::RecordHandle;
use crate::upload::UploadRequest;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Named extension points of the upload pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    PreMove,
    PostMove,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::PreMove => f.write_str("pre.move"),
            HookStage::PostMove => f.write_str("post.move"),
        }
    }
}

impl FromStr for HookStage {
    type Err = FieldError;

    fn from_str(s: &str) -> FieldResult<Self> {
        match s {
            "pre.move" => Ok(HookStage::PreMove),
            "post.move" => Ok(HookStage::PostMove),
            other => Err(FieldError::Config(format!(
                "Unsupported hook stage: {}",
                other
            ))),
        }
    }
}

/// Callback observing (or vetoing) an upload before the file is moved.
#[async_trait]
pub trait PreMoveHook: Send + Sync {
    async fn run(&self, record: &RecordHandle, upload: &UploadRequest) -> anyhow::Result<()>;
}

/// Callback observing an upload after the move and metadata update.
#[async_trait]
pub trait PostMoveHook: Send + Sync {
    async fn run(
        &self,
        record: &RecordHandle,
        upload: &UploadRequest,
        attachment: &Attachment,
    ) -> anyhow::Result<()>;
}

/// Ordered hook callbacks for both stages. One registry per field
/// configuration; callbacks can be added after construction but never
/// removed.
#[derive(Clone, Default)]
pub struct HookRegistry {
    pre_move: Vec<Arc<dyn PreMoveHook>>,
    post_move: Vec<Arc<dyn PostMoveHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-stage callback. The only recognized event is `move`;
    /// anything else is a configuration error, raised here rather than at
    /// run time.
    pub fn register_pre(&mut self, event: &str, hook: Arc<dyn PreMoveHook>) -> FieldResult<()> {
        if event != "move" {
            return Err(FieldError::Config(format!(
                "Unsupported pre event: {}",
                event
            )));
        }
        self.pre_move.push(hook);
        Ok(())
    }

    /// Register a post-stage callback. See [`register_pre`](Self::register_pre).
    pub fn register_post(&mut self, event: &str, hook: Arc<dyn PostMoveHook>) -> FieldResult<()> {
        if event != "move" {
            return Err(FieldError::Config(format!(
                "Unsupported post event: {}",
                event
            )));
        }
        self.post_move.push(hook);
        Ok(())
    }

    /// Run the `pre.move` chain. Each callback completes before the next
    /// starts; the first error short-circuits the rest.
    pub async fn run_pre_move(
        &self,
        record: &RecordHandle,
        upload: &UploadRequest,
    ) -> FieldResult<()> {
        for hook in &self.pre_move {
            hook.run(record, upload).await.map_err(|e| {
                tracing::debug!(stage = %HookStage::PreMove, error = %e, "Hook chain aborted");
                FieldError::Hook {
                    stage: HookStage::PreMove,
                    message: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    /// Run the `post.move` chain with the finalized attachment.
    pub async fn run_post_move(
        &self,
        record: &RecordHandle,
        upload: &UploadRequest,
        attachment: &Attachment,
    ) -> FieldResult<()> {
        for hook in &self.post_move {
            hook.run(record, upload, attachment).await.map_err(|e| {
                tracing::debug!(stage = %HookStage::PostMove, error = %e, "Hook chain aborted");
                FieldError::Hook {
                    stage: HookStage::PostMove,
                    message: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}
