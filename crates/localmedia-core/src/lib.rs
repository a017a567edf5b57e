//! Localmedia Core Library
//!
//! This crate provides the domain models, error types, field options, hook
//! registry, and trait seams shared across all localmedia components.

pub mod attachment;
pub mod derivative;
pub mod error;
pub mod hooks;
pub mod options;
pub mod record;
pub mod resize;
pub mod upload;

// Re-export commonly used types
pub use attachment::{Attachment, AttachmentItem, AttachmentList, RemoveMode};
pub use derivative::{default_specs, DerivativeSpec, ResampleOp, RESAMPLE_DIR};
pub use error::{FieldError, FieldResult};
pub use hooks::{HookRegistry, HookStage, PostMoveHook, PreMoveHook};
pub use options::{FieldOptions, RenameFn};
pub use record::{MemoryRecord, RecordHandle, RecordStore};
pub use resize::{NoOpResizer, Resizer};
pub use upload::UploadRequest;
