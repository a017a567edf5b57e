//! `image`-crate backed resize capability.

use async_trait::async_trait;
use image::imageops::FilterType;
use image::GenericImageView;
use localmedia_core::derivative::ResampleOp;
use localmedia_core::resize::Resizer;
use std::path::Path;

/// Resizer that decodes and re-encodes with the `image` crate. The output
/// format follows the destination extension.
pub struct ImageResizer;

impl ImageResizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resizer for ImageResizer {
    async fn resize(
        &self,
        op: ResampleOp,
        src: &Path,
        dst: &Path,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()> {
        let src = src.to_path_buf();
        let dst = dst.to_path_buf();

        // Image decode is CPU-bound; run off the async pool to avoid
        // blocking other tasks.
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let img = image::ImageReader::open(&src)?
                .with_guessed_format()?
                .decode()?;

            let out = match op {
                ResampleOp::Thumbnail => img.resize_to_fill(width, height, FilterType::Lanczos3),
                ResampleOp::Resize => img.resize(width, height, FilterType::Lanczos3),
                ResampleOp::Crop => {
                    let (w, h) = img.dimensions();
                    let cw = width.min(w);
                    let ch = height.min(h);
                    img.crop_imm((w - cw) / 2, (h - ch) / 2, cw, ch)
                }
            };

            if let Some(parent) = dst.parent() {
                std::fs::create_dir_all(parent)?;
            }
            out.save(&dst)?;
            Ok(())
        })
        .await??;

        Ok(())
    }
}
