//! Request adapter.
//!
//! Translates an already-decoded form submission into field operations.
//! Expected parts are an action directive, an ordering directive (list
//! fields only), and zero or more uploaded files. The adapter saves the
//! record once after applying everything; the pipeline itself never saves.

use crate::multi::LocalImageListField;
use crate::single::LocalImageField;
use localmedia_core::attachment::{Attachment, AttachmentList};
use localmedia_core::error::{FieldError, FieldResult};
use localmedia_core::record::RecordHandle;
use localmedia_core::upload::UploadRequest;
use uuid::Uuid;

/// One decoded form submission for an attachment field.
#[derive(Clone, Debug, Default)]
pub struct FieldRequest {
    /// `delete` / `reset` for single fields; `{mode}:{ids}` groups for
    /// list fields.
    pub action: Option<String>,
    /// Comma-separated identity tokens (list fields only).
    pub order: Option<String>,
    /// Uploaded files, already spooled to temp paths.
    pub uploads: Vec<UploadRequest>,
}

async fn save(record: &RecordHandle) -> FieldResult<()> {
    record
        .lock()
        .await
        .save()
        .await
        .map_err(|e| FieldError::Save(e.to_string()))
}

impl LocalImageField {
    /// Handle a form submission: apply the action, then upload the first
    /// non-empty file as the field's new value. Returns the new attachment
    /// when an upload happened.
    pub async fn handle_request(
        &self,
        record: &RecordHandle,
        request: FieldRequest,
    ) -> FieldResult<Option<Attachment>> {
        match request.action.as_deref() {
            Some("delete") => {
                self.store.delete(record).await?;
            }
            Some("reset") => {
                self.store.reset(record).await?;
            }
            _ => {}
        }

        let upload = request.uploads.into_iter().find(|u| u.size > 0);
        let attachment = match upload {
            Some(upload) => Some(self.upload(record, upload, true).await?),
            None => None,
        };

        save(record).await?;
        Ok(attachment)
    }
}

impl LocalImageListField {
    /// Handle a form submission: reorder, apply removals, then append the
    /// uploaded files. Returns the resulting list.
    pub async fn handle_request(
        &self,
        record: &RecordHandle,
        request: FieldRequest,
    ) -> FieldResult<AttachmentList> {
        if let Some(order) = &request.order {
            let ids: Vec<Uuid> = order
                .split(',')
                .filter_map(|id| Uuid::parse_str(id.trim()).ok())
                .collect();
            self.reorder(record, &ids).await?;
        }

        if let Some(action) = &request.action {
            self.remove_directive(record, action).await?;
        }

        let uploads: Vec<UploadRequest> =
            request.uploads.into_iter().filter(|u| u.size > 0).collect();
        if !uploads.is_empty() {
            self.upload_many(record, uploads, false).await?;
        }

        save(record).await?;
        Ok(self.load(record).await)
    }
}
