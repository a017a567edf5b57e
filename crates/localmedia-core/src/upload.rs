//! Upload request descriptor.

use std::path::PathBuf;

/// One incoming file, already decoded from its transport (multipart form,
/// request body, etc.) and spooled to a temporary location.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    /// Where the decoded file currently sits.
    pub temp_path: PathBuf,
    /// The filename the client supplied.
    pub original_name: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Declared MIME type.
    pub content_type: String,
}
