//! Localmedia Storage Library
//!
//! This crate provides the filesystem seam for the upload pipeline: the
//! [`FileStore`] trait with a local implementation, and the pure naming
//! resolver that produces collision-free destination filenames.
//!
//! # Naming
//!
//! A candidate name is the original filename, optionally prefixed with a
//! formatted date (`<prefix>-<original>`). If the candidate already exists in
//! the destination directory, the resolver appends the directory's current
//! entry count to the stem, once. Name resolution never touches the
//! filesystem; callers supply the directory listing.

pub mod local;
pub mod naming;
pub mod traits;

// Re-export commonly used types
pub use local::LocalFileStore;
pub use naming::{candidate_name, candidate_name_at, resolve_collision};
pub use traits::{FileStore, StoreError, StoreResult};
