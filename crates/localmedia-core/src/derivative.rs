//! Derivative specifications.
//!
//! A derivative is a resized variant of a stored image, described by a
//! compact token `<op>x<width>x<height>` (e.g. `thumbnailx160x160`).
//! Derivatives live in a fixed `_resampled` subdirectory of the field's
//! destination, named `<stem>_<token><ext>`.

use crate::error::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Subdirectory of the destination that holds generated derivatives.
pub const RESAMPLE_DIR: &str = "_resampled";

/// Supported resample operations. Unknown operation names in a token are a
/// configuration error, raised when the field is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleOp {
    /// Cover-resize and center-crop to exactly width x height.
    Thumbnail,
    /// Aspect-preserving fit within width x height.
    Resize,
    /// Center crop to width x height without resizing.
    Crop,
}

impl ResampleOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResampleOp::Thumbnail => "thumbnail",
            ResampleOp::Resize => "resize",
            ResampleOp::Crop => "crop",
        }
    }
}

impl fmt::Display for ResampleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResampleOp {
    type Err = FieldError;

    fn from_str(s: &str) -> FieldResult<Self> {
        match s {
            "thumbnail" => Ok(ResampleOp::Thumbnail),
            "resize" => Ok(ResampleOp::Resize),
            "crop" => Ok(ResampleOp::Crop),
            other => Err(FieldError::Config(format!(
                "Unsupported resample operation: {}",
                other
            ))),
        }
    }
}

/// A named transformation producing one resized variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivativeSpec {
    pub op: ResampleOp,
    pub width: u32,
    pub height: u32,
}

impl DerivativeSpec {
    pub fn new(op: ResampleOp, width: u32, height: u32) -> Self {
        Self { op, width, height }
    }

    /// Parse a compact `<op>x<width>x<height>` token. The dimensions are
    /// anchored at the right so the operation name is whatever precedes the
    /// final two `x`-separated numbers.
    pub fn parse(token: &str) -> FieldResult<Self> {
        let mut parts = token.rsplitn(3, 'x');
        let height = parts.next();
        let width = parts.next();
        let op = parts.next();

        let (op, width, height) = match (op, width, height) {
            (Some(op), Some(w), Some(h)) if !op.is_empty() => (op, w, h),
            _ => {
                return Err(FieldError::Config(format!(
                    "Malformed derivative token: {}",
                    token
                )))
            }
        };

        let width: u32 = width.parse().map_err(|_| {
            FieldError::Config(format!("Invalid derivative width in token: {}", token))
        })?;
        let height: u32 = height.parse().map_err(|_| {
            FieldError::Config(format!("Invalid derivative height in token: {}", token))
        })?;

        Ok(Self {
            op: op.parse()?,
            width,
            height,
        })
    }

    /// The compact token form, used as the filename tag.
    pub fn token(&self) -> String {
        format!("{}x{}x{}", self.op, self.width, self.height)
    }

    /// Filename of this derivative for a given source filename:
    /// `<stem>_<token><ext>`.
    pub fn derivative_filename(&self, filename: &str) -> String {
        let (stem, ext) = split_stem_ext(filename);
        format!("{}_{}{}", stem, self.token(), ext)
    }

    /// Full path of this derivative under `dir/_resampled/`.
    pub fn derivative_path(&self, dir: &Path, filename: &str) -> PathBuf {
        dir.join(RESAMPLE_DIR).join(self.derivative_filename(filename))
    }
}

/// The default derivative set for a field: one 160x160 thumbnail.
pub fn default_specs() -> Vec<DerivativeSpec> {
    vec![DerivativeSpec::new(ResampleOp::Thumbnail, 160, 160)]
}

/// Split a filename into stem and extension, keeping the dot with the
/// extension. Dotfiles and extension-less names yield an empty extension.
pub fn split_stem_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}
