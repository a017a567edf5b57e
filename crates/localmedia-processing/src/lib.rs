//! Localmedia Processing Library
//!
//! Derivative generation for stored images: fans the configured
//! [`DerivativeSpec`](localmedia_core::DerivativeSpec) set out over a
//! [`Resizer`](localmedia_core::Resizer) capability. The `image` feature
//! (default) ships [`ImageResizer`], backed by the `image` crate.

pub mod derivative;
#[cfg(feature = "image")]
pub mod resizer;

// Re-export commonly used types
pub use derivative::DerivativeGenerator;
#[cfg(feature = "image")]
pub use resizer::ImageResizer;
