//! Attachment metadata types.
//!
//! An [`Attachment`] describes one stored file. [`AttachmentList`] is the
//! ordered multi-file variant; each element carries a stable identity token
//! used to target it for reordering and removal. Both round-trip through the
//! record store as JSON.

use crate::error::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

/// Metadata for one stored file.
///
/// `filename` and `storage_path` are either both empty (no file attached) or
/// both non-empty, in which case the file lives at `storage_path/filename`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub storage_path: PathBuf,
    pub size: u64,
    pub mime_type: String,
}

impl Attachment {
    /// True when no file is attached.
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.storage_path.as_os_str().is_empty()
    }

    /// Full path of the stored file.
    pub fn file_path(&self) -> PathBuf {
        self.storage_path.join(&self.filename)
    }
}

/// One element of an [`AttachmentList`]. The `id` is assigned at creation
/// and stays stable for the item's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttachmentItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub attachment: Attachment,
}

impl AttachmentItem {
    pub fn new(attachment: Attachment) -> Self {
        Self {
            id: Uuid::new_v4(),
            attachment,
        }
    }
}

/// Ordered sequence of attachments for a multi-file field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentList(pub Vec<AttachmentItem>);

impl AttachmentList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttachmentItem> {
        self.0.iter()
    }

    pub fn push(&mut self, item: AttachmentItem) {
        self.0.push(item);
    }

    pub fn get(&self, id: Uuid) -> Option<&AttachmentItem> {
        self.0.iter().find(|item| item.id == id)
    }

    /// Splice out the item with the given identity token, if present.
    pub fn remove(&mut self, id: Uuid) -> Option<AttachmentItem> {
        let index = self.0.iter().position(|item| item.id == id)?;
        Some(self.0.remove(index))
    }

    /// Reorder the list to match a caller-supplied sequence of identity
    /// tokens. Items whose token is absent from the ordering are ties: they
    /// end up after the ordered items, keeping their relative order.
    pub fn reorder(&mut self, order: &[Uuid]) {
        self.0.sort_by_key(|item| {
            order
                .iter()
                .position(|id| *id == item.id)
                .unwrap_or(usize::MAX)
        });
    }
}

impl IntoIterator for AttachmentList {
    type Item = AttachmentItem;
    type IntoIter = std::vec::IntoIter<AttachmentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// How to detach an item from an attachment list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveMode {
    /// Detach the metadata entry, leaving files on disk.
    Remove,
    /// Detach the entry and delete the stored file plus its derivatives.
    Delete,
}

impl FromStr for RemoveMode {
    type Err = FieldError;

    fn from_str(s: &str) -> FieldResult<Self> {
        match s {
            "remove" => Ok(RemoveMode::Remove),
            "delete" => Ok(RemoveMode::Delete),
            other => Err(FieldError::Config(format!(
                "Unsupported removal mode: {}",
                other
            ))),
        }
    }
}
