//! Localmedia Field Library
//!
//! Attachment fields over a local destination directory: a single-file
//! variant ([`LocalImageField`]) and an ordered multi-file variant
//! ([`LocalImageListField`]). Both run the same per-file pipeline
//! (allow-list check, pre-move hooks, collision-free naming, move, metadata
//! update, derivative generation, post-move hooks) and share the
//! [`AttachmentField`] capability for reset/delete/exists.

pub mod adapter;
pub mod field;
pub mod multi;
pub mod request;
pub mod single;

// Re-export commonly used types
pub use adapter::AttachmentStore;
pub use field::AttachmentField;
pub use multi::LocalImageListField;
pub use request::FieldRequest;
pub use single::LocalImageField;
