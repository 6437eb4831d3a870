//! Video storage — uploads rendered videos to S3-compatible storage and
//! returns a public URL, with a local-URL fallback when the upload fails.

use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::Utc;
use tracing::{error, info};

use crate::errors::AppError;

/// S3-backed video storage. Cloning shares the underlying client.
#[derive(Clone)]
pub struct Storage {
    s3: S3Client,
    bucket: String,
    endpoint: String,
    base_url: String,
}

impl Storage {
    pub fn new(s3: S3Client, bucket: String, endpoint: String, base_url: String) -> Self {
        Self {
            s3,
            bucket,
            endpoint,
            base_url,
        }
    }

    /// Uploads a rendered video and returns its public URL.
    ///
    /// Keys are timestamped to avoid collisions between renders of the same
    /// scene. On upload failure the locally served URL is returned instead so
    /// the job can still complete.
    pub async fn upload_video(&self, local_path: &Path) -> String {
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4");
        let key = object_key(file_name, &Utc::now().format("%Y%m%d_%H%M%S").to_string());

        match self.put_object(local_path, &key).await {
            Ok(()) => {
                let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);
                info!(%key, %url, "Video uploaded to storage");
                url
            }
            Err(e) => {
                error!("Video upload failed, falling back to local URL: {e}");
                self.local_video_url(file_name)
            }
        }
    }

    /// URL under which the API itself serves a video from the local media
    /// directory.
    pub fn local_video_url(&self, file_name: &str) -> String {
        format!("{}/videos/{}", self.base_url, file_name)
    }

    /// True when `url` points at this service rather than remote storage.
    pub fn is_local_url(&self, url: &str) -> bool {
        url.starts_with(&self.base_url)
    }

    async fn put_object(&self, local_path: &Path, key: &str) -> Result<(), AppError> {
        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            AppError::Storage(format!("Cannot read {}: {e}", local_path.display()))
        })?;

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type_for(local_path))
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("put_object failed: {e}")))?;

        Ok(())
    }
}

/// Storage key for a video file: `videos/<stem>_<timestamp>.<ext>`.
fn object_key(file_name: &str, timestamp: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("videos/{stem}_{timestamp}.{ext}"),
        None => format!("videos/{file_name}_{timestamp}"),
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") => "video/mp4",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
