//! Single-file attachment field.
//!
//! One `LocalImageField` coordinates the whole pipeline for exactly one
//! incoming file: allow-list check, pre-move hooks, collision-free naming,
//! relocation, metadata update, derivative generation, post-move hooks.
//! Steps run strictly in that order; every hook and filesystem call
//! completes before the next step starts.

use crate::adapter::{store_io, AttachmentStore};
use localmedia_core::attachment::{Attachment, AttachmentItem};
use localmedia_core::derivative::{split_stem_ext, DerivativeSpec, RESAMPLE_DIR};
use localmedia_core::error::{FieldError, FieldResult};
use localmedia_core::hooks::{HookRegistry, PostMoveHook, PreMoveHook};
use localmedia_core::options::FieldOptions;
use localmedia_core::record::RecordHandle;
use localmedia_core::resize::Resizer;
use localmedia_core::upload::UploadRequest;
use localmedia_processing::DerivativeGenerator;
use localmedia_storage::{naming, FileStore};
use std::path::PathBuf;
use std::sync::Arc;

/// How the pipeline writes the finalized attachment to the record. The
/// write always happens between the move and derivative generation, so
/// post-move hooks observe the updated record and a derivative failure
/// cannot lose an attached file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StoreWrite {
    /// Leave the record untouched; the caller only gets the attachment.
    Skip,
    /// Replace the field's single-attachment metadata.
    Set,
    /// Append the attachment to the field's stored list.
    Append,
}

/// Attachment field holding at most one stored file.
#[derive(Clone)]
pub struct LocalImageField {
    pub(crate) options: FieldOptions,
    pub(crate) hooks: HookRegistry,
    pub(crate) specs: Vec<DerivativeSpec>,
    pub(crate) store: AttachmentStore,
    pub(crate) files: Arc<dyn FileStore>,
    pub(crate) generator: DerivativeGenerator,
}

impl LocalImageField {
    /// Build a field from its configuration. Fails fast on unsupported
    /// options: malformed derivative tokens, `initial` usage, bad hook
    /// events.
    pub fn new(
        field_path: impl Into<String>,
        options: FieldOptions,
        files: Arc<dyn FileStore>,
        resizer: Arc<dyn Resizer>,
    ) -> FieldResult<Self> {
        options.validate()?;
        let specs = options.specs()?;

        let mut hooks = HookRegistry::new();
        for hook in &options.pre_move {
            hooks.register_pre("move", hook.clone())?;
        }
        for hook in &options.post_move {
            hooks.register_post("move", hook.clone())?;
        }

        Ok(Self {
            store: AttachmentStore::new(field_path, files.clone()),
            generator: DerivativeGenerator::new(resizer),
            options,
            hooks,
            specs,
            files,
        })
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn specs(&self) -> &[DerivativeSpec] {
        &self.specs
    }

    /// Register a pre-stage hook after construction. The only recognized
    /// event is `move`.
    pub fn pre(&mut self, event: &str, hook: Arc<dyn PreMoveHook>) -> FieldResult<&mut Self> {
        self.hooks.register_pre(event, hook)?;
        Ok(self)
    }

    /// Register a post-stage hook after construction.
    pub fn post(&mut self, event: &str, hook: Arc<dyn PostMoveHook>) -> FieldResult<&mut Self> {
        self.hooks.register_post(event, hook)?;
        Ok(self)
    }

    /// Upload one file.
    ///
    /// With `replace` set, the attachment metadata is written to the record
    /// before derivative generation; without it the store is left untouched
    /// and only the finalized attachment is returned.
    ///
    /// A derivative failure aborts the remaining pipeline (post-hooks do
    /// not run) and surfaces as the operation's error even though the
    /// primary file, and metadata when `replace` is set, are already in
    /// place. The stored file stays authoritative; derivatives can be
    /// regenerated.
    pub async fn upload(
        &self,
        record: &RecordHandle,
        upload: UploadRequest,
        replace: bool,
    ) -> FieldResult<Attachment> {
        let write = if replace {
            StoreWrite::Set
        } else {
            StoreWrite::Skip
        };
        self.upload_with(record, upload, write).await
    }

    /// Run the pipeline with an explicit store-write strategy (the list
    /// field appends instead of setting).
    pub(crate) async fn upload_with(
        &self,
        record: &RecordHandle,
        upload: UploadRequest,
        write: StoreWrite,
    ) -> FieldResult<Attachment> {
        if !self.options.type_allowed(&upload.content_type) {
            return Err(FieldError::UnsupportedType {
                content_type: upload.content_type.clone(),
                allowed: self.options.allowed_types.clone().unwrap_or_default(),
            });
        }

        self.hooks.run_pre_move(record, &upload).await?;

        let final_name = self.resolve_name(record, &upload.original_name).await?;
        let dest = self.options.dest.clone();
        let stored_path = dest.join(&final_name);

        self.files
            .move_file(&upload.temp_path, &stored_path)
            .await
            .map_err(|e| FieldError::MoveFailed(e.to_string()))?;

        let attachment = Attachment {
            filename: final_name,
            storage_path: dest.clone(),
            size: upload.size,
            mime_type: upload.content_type.clone(),
        };

        match write {
            StoreWrite::Set => self.store.set_single(record, &attachment).await?,
            StoreWrite::Append => {
                self.store
                    .append(record, AttachmentItem::new(attachment.clone()))
                    .await?
            }
            StoreWrite::Skip => {}
        }

        self.generator
            .generate(&stored_path, &dest, &self.specs)
            .await?;

        self.hooks.run_post_move(record, &upload, &attachment).await?;

        tracing::info!(
            field = %self.store.field_path(),
            filename = %attachment.filename,
            size_bytes = attachment.size,
            "Upload complete"
        );

        Ok(attachment)
    }

    /// Compute the collision-free destination name for an incoming file:
    /// date prefix, then the configured rename function, then the one-shot
    /// entry-count disambiguator against the destination's current listing.
    pub(crate) async fn resolve_name(
        &self,
        record: &RecordHandle,
        original: &str,
    ) -> FieldResult<String> {
        let mut name = naming::candidate_name(original, self.options.date_prefix.as_deref());

        if let Some(rename) = &self.options.rename {
            let guard = record.lock().await;
            name = rename.rename(&*guard, &name);
        }

        let existing = self
            .files
            .list_dir(&self.options.dest)
            .await
            .map_err(store_io)?;

        Ok(naming::resolve_collision(&name, &existing))
    }

    /// Path of one derivative of an attachment, by spec token.
    pub fn thumb(&self, attachment: &Attachment, token: &str) -> PathBuf {
        let (stem, ext) = split_stem_ext(&attachment.filename);
        attachment
            .storage_path
            .join(RESAMPLE_DIR)
            .join(format!("{}_{}{}", stem, token, ext))
    }

    /// Public href of the attachment's default derivative, with the
    /// configured public prefix stripped from the storage path.
    pub fn href(&self, attachment: &Attachment) -> String {
        let path = attachment.storage_path.to_string_lossy();
        let web = match path.strip_prefix(&self.options.public_prefix) {
            Some(rest) => format!("/{}", rest),
            None => path.into_owned(),
        };
        let token = self
            .specs
            .first()
            .map(|spec| spec.token())
            .unwrap_or_else(|| "thumbnailx160x160".to_string());
        let (stem, ext) = split_stem_ext(&attachment.filename);
        format!("{}/{}/{}_{}{}", web, RESAMPLE_DIR, stem, token, ext)
    }

    /// Current attachment metadata, if any.
    pub async fn load(&self, record: &RecordHandle) -> Option<Attachment> {
        self.store.load(record).await
    }

    /// Whether the field has been written since the record's last save.
    pub async fn is_modified(&self, record: &RecordHandle) -> bool {
        self.store.is_modified(record).await
    }
}
