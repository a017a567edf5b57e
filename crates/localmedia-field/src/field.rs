//! Shared attachment-field capability.
//!
//! The single-file and list variants are two concrete implementations of
//! one capability, not an inheritance hierarchy.

use crate::multi::LocalImageListField;
use crate::single::LocalImageField;
use localmedia_core::attachment::AttachmentList;
use localmedia_core::error::FieldResult;
use localmedia_core::record::RecordHandle;
use async_trait::async_trait;

/// Operations every attachment field supports, independent of arity.
#[async_trait]
pub trait AttachmentField: Send + Sync {
    /// Whether a stored file is present (metadata set and file on disk).
    async fn exists(&self, record: &RecordHandle) -> bool;

    /// Clear the field's metadata, leaving disk state alone.
    async fn reset(&self, record: &RecordHandle) -> FieldResult<()>;

    /// Remove stored files from disk and clear the metadata.
    async fn delete(&self, record: &RecordHandle) -> FieldResult<()>;
}

#[async_trait]
impl AttachmentField for LocalImageField {
    async fn exists(&self, record: &RecordHandle) -> bool {
        self.store.exists(record).await
    }

    async fn reset(&self, record: &RecordHandle) -> FieldResult<()> {
        self.store.reset(record).await
    }

    async fn delete(&self, record: &RecordHandle) -> FieldResult<()> {
        self.store.delete(record).await
    }
}

#[async_trait]
impl AttachmentField for LocalImageListField {
    /// True when at least one listed item's file is present on disk.
    async fn exists(&self, record: &RecordHandle) -> bool {
        let list = self.store().load_list(record).await;
        for item in list.iter() {
            if self.pipeline.files.exists(&item.attachment.file_path()).await {
                return true;
            }
        }
        false
    }

    async fn reset(&self, record: &RecordHandle) -> FieldResult<()> {
        self.store()
            .store_list(record, &AttachmentList::default())
            .await
    }

    /// Delete every listed file and its derivatives, then clear the list.
    async fn delete(&self, record: &RecordHandle) -> FieldResult<()> {
        let list = self.store().load_list(record).await;
        for item in list.iter() {
            self.store()
                .remove_from_list(
                    record,
                    item.id,
                    localmedia_core::RemoveMode::Delete,
                    self.specs(),
                )
                .await?;
        }
        Ok(())
    }
}
