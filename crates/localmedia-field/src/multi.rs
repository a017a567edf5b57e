//! Multi-file attachment field.
//!
//! Wraps the single-file pipeline and runs it once per incoming file.
//! Files in a batch process sequentially: the destination listing is
//! re-read for each file, so a name resolved for file N accounts for files
//! moved earlier in the same request. The batch is fail-fast; attachments
//! persisted before a failure stay persisted.

use crate::adapter::AttachmentStore;
use crate::single::{LocalImageField, StoreWrite};
use localmedia_core::attachment::{AttachmentList, RemoveMode};
use localmedia_core::derivative::DerivativeSpec;
use localmedia_core::error::FieldResult;
use localmedia_core::hooks::{PostMoveHook, PreMoveHook};
use localmedia_core::options::FieldOptions;
use localmedia_core::record::RecordHandle;
use localmedia_core::resize::Resizer;
use localmedia_core::upload::UploadRequest;
use localmedia_storage::FileStore;
use std::sync::Arc;
use uuid::Uuid;

/// Attachment field holding an ordered list of stored files.
#[derive(Clone)]
pub struct LocalImageListField {
    pub(crate) pipeline: LocalImageField,
}

impl LocalImageListField {
    pub fn new(
        field_path: impl Into<String>,
        options: FieldOptions,
        files: Arc<dyn FileStore>,
        resizer: Arc<dyn Resizer>,
    ) -> FieldResult<Self> {
        Ok(Self {
            pipeline: LocalImageField::new(field_path, options, files, resizer)?,
        })
    }

    pub fn options(&self) -> &FieldOptions {
        self.pipeline.options()
    }

    pub fn specs(&self) -> &[DerivativeSpec] {
        self.pipeline.specs()
    }

    pub(crate) fn store(&self) -> &AttachmentStore {
        &self.pipeline.store
    }

    /// Register a pre-stage hook; runs for every file in a batch.
    pub fn pre(&mut self, event: &str, hook: Arc<dyn PreMoveHook>) -> FieldResult<&mut Self> {
        self.pipeline.pre(event, hook)?;
        Ok(self)
    }

    /// Register a post-stage hook; runs for every file in a batch.
    pub fn post(&mut self, event: &str, hook: Arc<dyn PostMoveHook>) -> FieldResult<&mut Self> {
        self.pipeline.post(event, hook)?;
        Ok(self)
    }

    /// Upload a batch of files. Each file is appended to the stored list
    /// inside its own pipeline run, between the move and derivative
    /// generation, so post-move hooks already see the item and a moved
    /// file cannot end up unattached. With `replace` set the list is
    /// cleared first.
    ///
    /// The first per-file failure aborts the remaining batch and surfaces
    /// as the operation's error; files appended before it are not rolled
    /// back.
    pub async fn upload_many(
        &self,
        record: &RecordHandle,
        uploads: Vec<UploadRequest>,
        replace: bool,
    ) -> FieldResult<AttachmentList> {
        if replace {
            self.store()
                .store_list(record, &AttachmentList::default())
                .await?;
        }

        for upload in uploads {
            self.pipeline
                .upload_with(record, upload, StoreWrite::Append)
                .await?;
        }

        Ok(self.store().load_list(record).await)
    }

    /// Current attachment list.
    pub async fn load(&self, record: &RecordHandle) -> AttachmentList {
        self.store().load_list(record).await
    }

    /// Reorder the stored list to match a sequence of identity tokens.
    /// Tokens not present in the list are ignored; items not named in the
    /// ordering keep their relative order after the ordered ones.
    pub async fn reorder(&self, record: &RecordHandle, order: &[Uuid]) -> FieldResult<AttachmentList> {
        let mut list = self.store().load_list(record).await;
        list.reorder(order);
        self.store().store_list(record, &list).await?;
        Ok(list)
    }

    /// Detach one item by identity token.
    pub async fn remove_item(
        &self,
        record: &RecordHandle,
        id: Uuid,
        mode: RemoveMode,
    ) -> FieldResult<()> {
        self.store()
            .remove_from_list(record, id, mode, self.specs())
            .await
    }

    /// Apply a compound removal directive: `{mode}:{id,id,...}` groups
    /// joined with `|`, e.g. `delete:ID1,ID2|remove:ID3`. Groups with an
    /// unrecognized mode, missing ids, or unparsable tokens are skipped.
    pub async fn remove_directive(&self, record: &RecordHandle, directive: &str) -> FieldResult<()> {
        for group in directive.split('|') {
            let Some((mode, ids)) = group.split_once(':') else {
                continue;
            };
            let Ok(mode) = mode.parse::<RemoveMode>() else {
                continue;
            };
            if ids.is_empty() {
                continue;
            }
            for id in ids.split(',') {
                let Ok(id) = Uuid::parse_str(id.trim()) else {
                    continue;
                };
                self.remove_item(record, id, mode).await?;
            }
        }
        Ok(())
    }

    /// Whether the field has been written since the record's last save.
    pub async fn is_modified(&self, record: &RecordHandle) -> bool {
        self.pipeline.is_modified(record).await
    }
}
