use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewUpload, UploadRecord};

/// Location of a file inside the storage bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFileHandle {
    pub path: String,
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// All uploads, newest first.
    async fn list_uploads(&self) -> Result<Vec<UploadRecord>>;

    async fn insert_upload(&self, upload: NewUpload) -> Result<UploadRecord>;
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store_file(&self, path: &str, content: Vec<u8>) -> Result<StoredFileHandle>;

    fn public_url(&self, handle: &StoredFileHandle) -> String;
}
