//! Attachment store adapter.
//!
//! Thin interface over the external record store for one field path. The
//! adapter exclusively owns persisted attachment metadata; orchestrators
//! never cache it beyond a single operation. For existence checks the disk
//! is authoritative, not the metadata.

use localmedia_core::attachment::{Attachment, AttachmentItem, AttachmentList, RemoveMode};
use localmedia_core::derivative::DerivativeSpec;
use localmedia_core::error::{FieldError, FieldResult};
use localmedia_core::record::RecordHandle;
use localmedia_storage::{FileStore, StoreError};
use std::io;
use std::sync::Arc;
use uuid::Uuid;

/// Map a filesystem error into the operation taxonomy.
pub(crate) fn store_io(e: StoreError) -> FieldError {
    match e {
        StoreError::Io(io) => FieldError::Io(io),
        other => FieldError::Io(io::Error::other(other.to_string())),
    }
}

fn serialize<T: serde::Serialize>(value: &T) -> FieldResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| FieldError::Save(e.to_string()))
}

/// Reads and writes one field's attachment metadata on the owning record.
#[derive(Clone)]
pub struct AttachmentStore {
    field_path: String,
    files: Arc<dyn FileStore>,
}

impl AttachmentStore {
    pub fn new(field_path: impl Into<String>, files: Arc<dyn FileStore>) -> Self {
        Self {
            field_path: field_path.into(),
            files,
        }
    }

    pub fn field_path(&self) -> &str {
        &self.field_path
    }

    /// Current attachment metadata, or `None` when nothing is attached.
    pub async fn load(&self, record: &RecordHandle) -> Option<Attachment> {
        let value = record.lock().await.get(&self.field_path)?;
        serde_json::from_value::<Attachment>(value)
            .ok()
            .filter(|attachment| !attachment.is_empty())
    }

    /// Replace the stored metadata with the given attachment.
    pub async fn set_single(
        &self,
        record: &RecordHandle,
        attachment: &Attachment,
    ) -> FieldResult<()> {
        let value = serialize(attachment)?;
        record.lock().await.set(&self.field_path, value);
        Ok(())
    }

    /// Clear the metadata to its empty shape, independent of disk state.
    /// Idempotent: resetting an already-empty field is a no-op.
    pub async fn reset(&self, record: &RecordHandle) -> FieldResult<()> {
        self.set_single(record, &Attachment::default()).await
    }

    /// True iff metadata is present and the file is actually on disk.
    pub async fn exists(&self, record: &RecordHandle) -> bool {
        match self.load(record).await {
            Some(attachment) => self.files.exists(&attachment.file_path()).await,
            None => false,
        }
    }

    /// Remove the stored file (if any) and reset the metadata. An
    /// already-absent file is success.
    pub async fn delete(&self, record: &RecordHandle) -> FieldResult<()> {
        if let Some(attachment) = self.load(record).await {
            self.files
                .remove(&attachment.file_path())
                .await
                .map_err(store_io)?;
        }
        self.reset(record).await
    }

    /// Whether the field has been written since the record's last save.
    pub async fn is_modified(&self, record: &RecordHandle) -> bool {
        record.lock().await.is_modified(&self.field_path)
    }

    /// Current attachment list; an absent or malformed value loads as empty.
    pub async fn load_list(&self, record: &RecordHandle) -> AttachmentList {
        let value = record.lock().await.get(&self.field_path);
        value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Replace the stored list.
    pub async fn store_list(&self, record: &RecordHandle, list: &AttachmentList) -> FieldResult<()> {
        let value = serialize(list)?;
        record.lock().await.set(&self.field_path, value);
        Ok(())
    }

    /// Append one item to the stored list.
    pub async fn append(&self, record: &RecordHandle, item: AttachmentItem) -> FieldResult<()> {
        let mut list = self.load_list(record).await;
        list.push(item);
        self.store_list(record, &list).await
    }

    /// Detach the item with the given identity token. `RemoveMode::Delete`
    /// also removes the stored file and every configured derivative from
    /// disk before splicing the entry out. An unknown token is a no-op.
    pub async fn remove_from_list(
        &self,
        record: &RecordHandle,
        id: Uuid,
        mode: RemoveMode,
        specs: &[DerivativeSpec],
    ) -> FieldResult<()> {
        let mut list = self.load_list(record).await;
        let Some(item) = list.remove(id) else {
            tracing::debug!(id = %id, field = %self.field_path, "Removal target not in list");
            return Ok(());
        };

        if mode == RemoveMode::Delete {
            let attachment = &item.attachment;
            self.files
                .remove(&attachment.file_path())
                .await
                .map_err(store_io)?;
            for spec in specs {
                let thumb = spec.derivative_path(&attachment.storage_path, &attachment.filename);
                self.files.remove(&thumb).await.map_err(store_io)?;
            }
        }

        self.store_list(record, &list).await
    }
}
