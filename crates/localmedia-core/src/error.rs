//! Error types module
//!
//! All upload-pipeline errors are unified under the `FieldError` enum:
//! configuration errors raised at field construction, validation errors
//! raised before any filesystem mutation, and hook/IO errors raised while an
//! operation is in flight.

use crate::hooks::HookStage;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported file type: {content_type}")]
    UnsupportedType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("{stage} hook failed: {message}")]
    Hook { stage: HookStage, message: String },

    #[error("Move failed: {0}")]
    MoveFailed(String),

    #[error("Resize failed: {0}")]
    Resize(String),

    #[error("Record save failed: {0}")]
    Save(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for field operations
pub type FieldResult<T> = Result<T, FieldError>;

impl FieldError {
    /// Get the error type name for detailed error reporting
    pub fn error_type(&self) -> &'static str {
        match self {
            FieldError::Config(_) => "Config",
            FieldError::UnsupportedType { .. } => "UnsupportedType",
            FieldError::Hook { .. } => "Hook",
            FieldError::MoveFailed(_) => "MoveFailed",
            FieldError::Resize(_) => "Resize",
            FieldError::Save(_) => "Save",
            FieldError::Io(_) => "Io",
        }
    }

    /// Whether the caller may retry the operation. Configuration and
    /// validation errors will fail identically on retry; IO-class errors
    /// may succeed once the underlying condition clears.
    pub fn is_recoverable(&self) -> bool {
        match self {
            FieldError::Config(_) | FieldError::UnsupportedType { .. } => false,
            FieldError::Hook { .. } => true,
            FieldError::MoveFailed(_) | FieldError::Resize(_) | FieldError::Io(_) => true,
            FieldError::Save(_) => true,
        }
    }
}
