use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ArchiveError, Result};
use crate::store::{FileStorage, StoredFileHandle};

pub const DEFAULT_BUCKET: &str = "exam-files";

#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Object storage bucket reached over the hosted backend's storage REST API.
pub struct BucketStorage {
    client: reqwest::Client,
    base_url: Url,
    bucket: String,
    api_key: String,
}

impl BucketStorage {
    pub fn new(base_url: &str, bucket: &str, api_key: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ArchiveError::Storage(format!("invalid storage url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ArchiveError::Storage(format!(
                "storage url {base_url} cannot hold object paths"
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("exam-archive/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ArchiveError::Storage(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            bucket: bucket.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn object_url(&self, public: bool, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["storage", "v1", "object"]);
            if public {
                segments.push("public");
            }
            segments.push(&self.bucket);
            segments.extend(path.split('/').filter(|part| !part.is_empty()));
        }
        url
    }
}

#[async_trait]
impl FileStorage for BucketStorage {
    async fn store_file(&self, path: &str, content: Vec<u8>) -> Result<StoredFileHandle> {
        let url = self.object_url(false, path);
        let size = content.len();
        debug!(%url, size, "uploading object");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type(path))
            .body(content)
            .send()
            .await
            .map_err(|e| ArchiveError::Storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StorageErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.message.or(parsed.error))
                .unwrap_or(body);
            return Err(ArchiveError::Storage(format!("{status}: {message}")));
        }

        info!(path, size, "stored exam file");
        Ok(StoredFileHandle {
            path: path.to_string(),
        })
    }

    fn public_url(&self, handle: &StoredFileHandle) -> String {
        self.object_url(true, &handle.path).to_string()
    }
}

fn content_type(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}
