//! End-to-end field pipeline tests.

mod helpers;

use helpers::{
    init_tracing, missing_upload, spool_upload, CapturingPostHook, CountingPreHook,
    RecordingResizer,
};
use async_trait::async_trait;
use localmedia_core::attachment::{Attachment, AttachmentList};
use localmedia_core::hooks::PostMoveHook;
use localmedia_core::options::FieldOptions;
use localmedia_core::record::{MemoryRecord, RecordHandle};
use localmedia_core::upload::UploadRequest;
use localmedia_core::resize::Resizer;
use localmedia_field::{AttachmentField, FieldRequest, LocalImageField, LocalImageListField};
use localmedia_processing::ImageResizer;
use localmedia_storage::{FileStore, LocalFileStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::{tempdir, TempDir};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Post-move hook that records the stored list length at notification time.
struct ListLengthPostHook {
    seen_len: AtomicUsize,
}

#[async_trait]
impl PostMoveHook for ListLengthPostHook {
    async fn run(
        &self,
        record: &RecordHandle,
        _upload: &UploadRequest,
        _attachment: &Attachment,
    ) -> anyhow::Result<()> {
        let len = record
            .lock()
            .await
            .get("gallery")
            .and_then(|v| serde_json::from_value::<AttachmentList>(v).ok())
            .map(|l| l.len())
            .unwrap_or(0);
        self.seen_len.store(len, Ordering::SeqCst);
        Ok(())
    }
}

struct Fixture {
    spool: TempDir,
    dest: TempDir,
    files: Arc<LocalFileStore>,
    resizer: Arc<RecordingResizer>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_resizer(RecordingResizer::default())
    }

    fn with_resizer(resizer: RecordingResizer) -> Self {
        init_tracing();
        Self {
            spool: tempdir().unwrap(),
            dest: tempdir().unwrap(),
            files: Arc::new(LocalFileStore::new()),
            resizer: Arc::new(resizer),
        }
    }

    fn options(&self) -> FieldOptions {
        FieldOptions::new().dest(self.dest.path())
    }

    fn single(&self, options: FieldOptions) -> LocalImageField {
        LocalImageField::new("avatar", options, self.files.clone(), self.resizer.clone()).unwrap()
    }

    fn list(&self, options: FieldOptions) -> LocalImageListField {
        LocalImageListField::new("gallery", options, self.files.clone(), self.resizer.clone())
            .unwrap()
    }

    async fn dest_entries(&self) -> Vec<String> {
        let mut names = self.files.list_dir(self.dest.path()).await.unwrap();
        names.sort();
        names
    }
}

fn record() -> (Arc<Mutex<MemoryRecord>>, RecordHandle) {
    let record = Arc::new(Mutex::new(MemoryRecord::new()));
    let handle: RecordHandle = record.clone();
    (record, handle)
}

#[tokio::test]
async fn upload_stores_file_with_declared_metadata() {
    let fx = Fixture::new();
    let field = fx.single(fx.options().allowed_types(["image/png"]));
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "photo.png", "image/png", b"pixels").await;
    let attachment = field.upload(&handle, upload, true).await.unwrap();

    assert_eq!(attachment.filename, "photo.png");
    assert_eq!(attachment.storage_path, fx.dest.path());
    assert_eq!(attachment.size, 6);
    assert_eq!(attachment.mime_type, "image/png");

    let stored = attachment.file_path();
    assert!(stored.exists());
    assert_eq!(std::fs::metadata(&stored).unwrap().len(), attachment.size);

    // metadata landed on the record and the default thumbnail was produced
    assert!(field.exists(&handle).await);
    assert_eq!(fx.resizer.call_count(), 1);
    assert!(fx
        .dest
        .path()
        .join("_resampled/photo_thumbnailx160x160.png")
        .exists());
}

#[tokio::test]
async fn disallowed_type_fails_before_any_mutation() {
    let fx = Fixture::new();
    let field = fx.single(fx.options().allowed_types(["image/png", "image/jpeg"]));
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "archive.zip", "application/zip", b"zip").await;
    let temp_path = upload.temp_path.clone();

    let err = field.upload(&handle, upload, true).await.unwrap_err();
    assert_eq!(err.error_type(), "UnsupportedType");

    // nothing moved, nothing attached
    assert!(temp_path.exists());
    assert!(fx.dest_entries().await.is_empty());
    assert!(!field.exists(&handle).await);
}

#[tokio::test]
async fn colliding_name_gets_entry_count_suffix() {
    let fx = Fixture::new();
    let field = fx.single(fx.options());
    let (_, handle) = record();

    for name in ["a.png", "b.png", "c.png"] {
        std::fs::write(fx.dest.path().join(name), b"existing").unwrap();
    }

    let upload = spool_upload(fx.spool.path(), "a.png", "image/png", b"new").await;
    let attachment = field.upload(&handle, upload, true).await.unwrap();

    // 3 entries in the destination, so the stem gets a literal 3
    assert_eq!(attachment.filename, "a3.png");
    assert!(fx.dest.path().join("a3.png").exists());
    assert_eq!(std::fs::read(fx.dest.path().join("a.png")).unwrap(), b"existing");
}

#[tokio::test]
async fn date_prefix_applies_before_collision_check() {
    let fx = Fixture::new();
    let field = fx.single(fx.options().date_prefix("%Y"));
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "a.png", "image/png", b"new").await;
    let attachment = field.upload(&handle, upload, true).await.unwrap();

    assert!(attachment.filename.ends_with("-a.png"));
    let year = &attachment.filename[..4];
    assert!(year.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn exists_is_false_after_external_removal() {
    let fx = Fixture::new();
    let field = fx.single(fx.options());
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "photo.png", "image/png", b"pixels").await;
    let attachment = field.upload(&handle, upload, true).await.unwrap();
    assert!(field.exists(&handle).await);

    std::fs::remove_file(attachment.file_path()).unwrap();
    assert!(!field.exists(&handle).await);
    // metadata is still present; only the disk check fails
    assert!(field.load(&handle).await.is_some());
}

#[tokio::test]
async fn failing_pre_hook_short_circuits_and_blocks_move() {
    let fx = Fixture::new();
    let first = Arc::new(CountingPreHook::failing());
    let second = Arc::new(CountingPreHook::default());
    let field = fx.single(
        fx.options()
            .pre_move(first.clone())
            .pre_move(second.clone()),
    );
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "photo.png", "image/png", b"pixels").await;
    let temp_path = upload.temp_path.clone();

    let err = field.upload(&handle, upload, true).await.unwrap_err();
    assert_eq!(err.error_type(), "Hook");
    assert!(err.to_string().contains("pre.move"));

    assert_eq!(first.call_count(), 1);
    assert_eq!(second.call_count(), 0);
    assert!(temp_path.exists());
    assert!(fx.dest_entries().await.is_empty());
}

#[tokio::test]
async fn post_hook_receives_finalized_attachment() {
    let fx = Fixture::new();
    let post = Arc::new(CapturingPostHook::default());
    let field = fx.single(fx.options().post_move(post.clone()));
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "photo.png", "image/png", b"pixels").await;
    field.upload(&handle, upload, true).await.unwrap();

    let seen = post.seen_paths();
    assert_eq!(seen, vec![fx.dest.path().join("photo.png")]);
}

#[tokio::test]
async fn derivative_failure_aborts_post_hooks_but_keeps_attachment() {
    let fx = Fixture::with_resizer(RecordingResizer::failing());
    let post = Arc::new(CapturingPostHook::default());
    let field = fx.single(fx.options().post_move(post.clone()));
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "photo.png", "image/png", b"pixels").await;
    let err = field.upload(&handle, upload, true).await.unwrap_err();

    assert_eq!(err.error_type(), "Resize");
    // the primary file and metadata update already happened
    assert!(fx.dest.path().join("photo.png").exists());
    assert!(field.load(&handle).await.is_some());
    // post hooks never ran
    assert!(post.seen_paths().is_empty());
}

#[tokio::test]
async fn batch_is_fail_fast_and_keeps_earlier_successes() {
    let fx = Fixture::new();
    let field = fx.list(fx.options());
    let (_, handle) = record();

    let x = spool_upload(fx.spool.path(), "x.jpg", "image/jpeg", b"xxxx").await;
    let y = missing_upload(fx.spool.path(), "y.jpg");

    let err = field.upload_many(&handle, vec![x, y], false).await.unwrap_err();
    assert_eq!(err.error_type(), "MoveFailed");
    assert!(err.to_string().contains("y.jpg"));

    // x.jpg stayed persisted and attached
    let list = field.load(&handle).await;
    assert_eq!(list.len(), 1);
    let item = list.iter().next().unwrap();
    assert_eq!(item.attachment.filename, "x.jpg");
    assert!(item.attachment.file_path().exists());
}

#[tokio::test]
async fn list_post_hook_sees_item_already_appended() {
    let fx = Fixture::new();
    let hook = Arc::new(ListLengthPostHook {
        seen_len: AtomicUsize::new(usize::MAX),
    });
    let field = fx.list(fx.options().post_move(hook.clone()));
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "a.png", "image/png", b"img").await;
    field.upload_many(&handle, vec![upload], false).await.unwrap();

    // the append happens before the post-move stage runs
    assert_eq!(hook.seen_len.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn derivative_failure_keeps_list_item_attached() {
    let fx = Fixture::with_resizer(RecordingResizer::failing());
    let field = fx.list(fx.options());
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "a.png", "image/png", b"img").await;
    let err = field
        .upload_many(&handle, vec![upload], false)
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "Resize");

    // the moved file was appended before derivative generation started
    let list = field.load(&handle).await;
    assert_eq!(list.len(), 1);
    let item = list.iter().next().unwrap();
    assert_eq!(item.attachment.filename, "a.png");
    assert!(item.attachment.file_path().exists());
}

#[tokio::test]
async fn batch_resolves_collisions_within_itself() {
    let fx = Fixture::new();
    let field = fx.list(fx.options());
    let (_, handle) = record();

    let first = spool_upload(fx.spool.path(), "a.png", "image/png", b"one").await;
    // same original filename as the first upload, separate temp file
    let second_temp = fx.spool.path().join("incoming-second-a.png");
    std::fs::write(&second_temp, b"two").unwrap();
    let second = localmedia_core::upload::UploadRequest {
        temp_path: second_temp,
        original_name: "a.png".to_string(),
        size: 3,
        content_type: "image/png".to_string(),
    };

    let list = field
        .upload_many(&handle, vec![first, second], false)
        .await
        .unwrap();

    let names: Vec<_> = list.iter().map(|i| i.attachment.filename.clone()).collect();
    assert_eq!(names[0], "a.png");
    assert_ne!(names[1], "a.png");
    for item in list.iter() {
        assert!(item.attachment.file_path().exists());
    }
}

#[tokio::test]
async fn reorder_directive_matches_requested_sequence() {
    let fx = Fixture::new();
    let field = fx.list(fx.options());
    let (_, handle) = record();

    let mut uploads = Vec::new();
    for name in ["a.png", "b.png", "c.png"] {
        uploads.push(spool_upload(fx.spool.path(), name, "image/png", b"img").await);
    }
    let list = field.upload_many(&handle, uploads, false).await.unwrap();
    let ids: Vec<Uuid> = list.iter().map(|i| i.id).collect();

    let request = FieldRequest {
        order: Some(format!("{},{},{}", ids[2], ids[0], ids[1])),
        ..Default::default()
    };
    let reordered = field.handle_request(&handle, request).await.unwrap();

    let names: Vec<_> = reordered
        .iter()
        .map(|i| i.attachment.filename.as_str())
        .collect();
    assert_eq!(names, vec!["c.png", "a.png", "b.png"]);
}

#[tokio::test]
async fn removal_directive_applies_modes_per_identity() {
    let fx = Fixture::new();
    let field = fx.list(fx.options());
    let (_, handle) = record();

    let mut uploads = Vec::new();
    for name in ["a.png", "b.png", "c.png"] {
        uploads.push(spool_upload(fx.spool.path(), name, "image/png", b"img").await);
    }
    let list = field.upload_many(&handle, uploads, false).await.unwrap();
    let items: Vec<_> = list.iter().cloned().collect();

    let request = FieldRequest {
        action: Some(format!("delete:{}|remove:{}", items[0].id, items[1].id)),
        ..Default::default()
    };
    let remaining = field.handle_request(&handle, request).await.unwrap();

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining.iter().next().unwrap().id, items[2].id);

    // delete removed the file and its thumbnail; remove left files on disk
    assert!(!items[0].attachment.file_path().exists());
    assert!(!fx
        .dest
        .path()
        .join("_resampled/a_thumbnailx160x160.png")
        .exists());
    assert!(items[1].attachment.file_path().exists());
    assert!(fx
        .dest
        .path()
        .join("_resampled/b_thumbnailx160x160.png")
        .exists());
}

#[tokio::test]
async fn single_request_handler_uploads_and_saves() {
    let fx = Fixture::new();
    let field = fx.single(fx.options());
    let (memory, handle) = record();

    let upload = spool_upload(fx.spool.path(), "photo.png", "image/png", b"pixels").await;
    let request = FieldRequest {
        uploads: vec![upload],
        ..Default::default()
    };

    let attachment = field.handle_request(&handle, request).await.unwrap();
    assert!(attachment.is_some());
    assert_eq!(memory.lock().await.save_count(), 1);
}

#[tokio::test]
async fn single_request_handler_delete_action() {
    let fx = Fixture::new();
    let field = fx.single(fx.options());
    let (_, handle) = record();

    let upload = spool_upload(fx.spool.path(), "photo.png", "image/png", b"pixels").await;
    let attachment = field.upload(&handle, upload, true).await.unwrap();
    assert!(attachment.file_path().exists());

    let request = FieldRequest {
        action: Some("delete".to_string()),
        ..Default::default()
    };
    let result = field.handle_request(&handle, request).await.unwrap();

    assert!(result.is_none());
    assert!(!attachment.file_path().exists());
    assert!(!field.exists(&handle).await);
}

#[tokio::test]
async fn reset_is_idempotent_through_the_field() {
    let fx = Fixture::new();
    let field = fx.single(fx.options());
    let (_, handle) = record();

    field.reset(&handle).await.unwrap();
    field.reset(&handle).await.unwrap();
    assert!(!field.exists(&handle).await);
}

#[tokio::test]
async fn image_resizer_produces_decodable_thumbnail() {
    init_tracing();
    let spool = tempdir().unwrap();
    let dest = tempdir().unwrap();
    let source = spool.path().join("incoming-real.png");
    image::RgbaImage::from_pixel(320, 240, image::Rgba([120, 10, 200, 255]))
        .save(&source)
        .unwrap();
    let size = std::fs::metadata(&source).unwrap().len();

    let field = LocalImageField::new(
        "avatar",
        FieldOptions::new().dest(dest.path()),
        Arc::new(LocalFileStore::new()),
        Arc::new(ImageResizer::new()) as Arc<dyn Resizer>,
    )
    .unwrap();
    let (_, handle) = record();

    let upload = localmedia_core::upload::UploadRequest {
        temp_path: source,
        original_name: "real.png".to_string(),
        size,
        content_type: "image/png".to_string(),
    };
    field.upload(&handle, upload, true).await.unwrap();

    let thumb = dest.path().join("_resampled/real_thumbnailx160x160.png");
    let decoded = image::ImageReader::open(&thumb).unwrap().decode().unwrap();
    assert_eq!((decoded.width(), decoded.height()), (160, 160));
}
