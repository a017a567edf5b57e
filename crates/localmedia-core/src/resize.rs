//! Resize capability seam.
//!
//! Derivative generation invokes an image-resize capability through this
//! trait so the pipeline never couples to a particular codec. The
//! `localmedia-processing` crate ships an `image`-crate backed
//! implementation; [`NoOpResizer`] is for fields that carry no derivatives.

use crate::derivative::ResampleOp;
use async_trait::async_trait;
use std::path::Path;

/// Produce one resized variant of `src` at `dst`.
#[async_trait]
pub trait Resizer: Send + Sync {
    async fn resize(
        &self,
        op: ResampleOp,
        src: &Path,
        dst: &Path,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()>;
}

/// No-op implementation for when derivative generation is disabled.
pub struct NoOpResizer;

#[async_trait]
impl Resizer for NoOpResizer {
    async fn resize(
        &self,
        _op: ResampleOp,
        _src: &Path,
        _dst: &Path,
        _width: u32,
        _height: u32,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
