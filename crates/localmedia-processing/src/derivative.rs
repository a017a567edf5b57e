//! Derivative generator.
//!
//! Produces every configured variant of a stored image under the
//! destination's `_resampled` subdirectory. Specs run as independent
//! futures; generation completes only once every spec has resolved. A
//! failed spec surfaces as the generation's error, and variants that
//! finished before it are left on disk: the canonical source image stays
//! authoritative and derivatives are regenerable.

use futures::future::join_all;
use localmedia_core::derivative::{DerivativeSpec, RESAMPLE_DIR};
use localmedia_core::error::{FieldError, FieldResult};
use localmedia_core::resize::Resizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fans derivative specs out over a resize capability.
#[derive(Clone)]
pub struct DerivativeGenerator {
    resizer: Arc<dyn Resizer>,
}

impl DerivativeGenerator {
    pub fn new(resizer: Arc<dyn Resizer>) -> Self {
        Self { resizer }
    }

    /// Generate one derivative per spec for the stored file at `source`.
    /// Returns the paths of all successfully written derivatives, or the
    /// first spec failure once every spec has settled.
    pub async fn generate(
        &self,
        source: &Path,
        dest_dir: &Path,
        specs: &[DerivativeSpec],
    ) -> FieldResult<Vec<PathBuf>> {
        if specs.is_empty() {
            return Ok(Vec::new());
        }

        let filename = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FieldError::Resize(format!("Invalid source path: {}", source.display())))?;

        tokio::fs::create_dir_all(dest_dir.join(RESAMPLE_DIR)).await?;

        let jobs = specs.iter().map(|spec| {
            let dst = spec.derivative_path(dest_dir, filename);
            let resizer = self.resizer.clone();
            async move {
                resizer
                    .resize(spec.op, source, &dst, spec.width, spec.height)
                    .await
                    .map(|_| {
                        tracing::debug!(
                            src = %source.display(),
                            dst = %dst.display(),
                            token = %spec.token(),
                            "Derivative generated"
                        );
                        dst
                    })
                    .map_err(|e| FieldError::Resize(format!("{}: {}", spec.token(), e)))
            }
        });

        let mut paths = Vec::with_capacity(specs.len());
        for result in join_all(jobs).await {
            paths.push(result?);
        }
        Ok(paths)
    }
}
