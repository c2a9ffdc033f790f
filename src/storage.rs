//! Publishing synthesized audio under a public URL.

use crate::config::{Settings, StorageProvider, StorageSettings};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Stores an audio file and returns the URL it can be fetched from.
#[async_trait]
pub trait AudioStore: Send + Sync {
    async fn store(&self, local_path: &Path, file_name: &str) -> Result<String>;
}

/// Build the configured store.
pub fn from_settings(settings: &Settings) -> Arc<dyn AudioStore> {
    match settings.storage.provider {
        StorageProvider::Local => Arc::new(LocalAudioStore::new(&settings.general.public_dir)),
        StorageProvider::S3 => Arc::new(S3AudioStore::new(&settings.storage)),
    }
}

/// Files stay in the download dir, which the server exposes under `public_dir`.
pub struct LocalAudioStore {
    public_dir: String,
}

impl LocalAudioStore {
    pub fn new(public_dir: &str) -> Self {
        Self {
            public_dir: public_dir.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AudioStore for LocalAudioStore {
    async fn store(&self, _local_path: &Path, file_name: &str) -> Result<String> {
        Ok(format!("{}/{}", self.public_dir, file_name))
    }
}

/// Uploads audio to a public-read S3 bucket.
pub struct S3AudioStore {
    bucket: Option<String>,
    region: String,
    folder: String,
}

impl S3AudioStore {
    pub fn new(settings: &StorageSettings) -> Self {
        Self {
            bucket: settings.bucket.clone(),
            region: settings.region.clone(),
            folder: settings.folder.trim_matches('/').to_string(),
        }
    }

    fn key(&self, file_name: &str) -> String {
        format!("{}/{}", self.folder, file_name)
    }

    fn public_url(&self, bucket: &str, file_name: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            bucket,
            self.region,
            self.key(file_name)
        )
    }
}

#[async_trait]
impl AudioStore for S3AudioStore {
    #[instrument(skip(self, local_path))]
    async fn store(&self, local_path: &Path, file_name: &str) -> Result<String> {
        let bucket = self
            .bucket
            .as_deref()
            .ok_or_else(|| RecapError::Storage("S3 bucket is not configured".into()))?;

        let shared = aws_config::from_env()
            .region(Region::new(self.region.clone()))
            .load()
            .await;
        let client = aws_sdk_s3::Client::new(&shared);

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| RecapError::Storage(format!("Failed to read {}: {e}", local_path.display())))?;

        let started = Instant::now();
        client
            .put_object()
            .bucket(bucket)
            .key(self.key(file_name))
            .body(body)
            .content_type("audio/mpeg")
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "S3 upload failed"
                );
                RecapError::Storage(format!("s3 put_object: {e}"))
            })?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Uploaded audio to S3"
        );
        Ok(self.public_url(bucket, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_url() {
        let store = LocalAudioStore::new("/public/audio/");
        let url = store
            .store(Path::new("/tmp/x.mp3"), "20250101_abcdefgh.mp3")
            .await
            .unwrap();
        assert_eq!(url, "/public/audio/20250101_abcdefgh.mp3");
    }

    #[test]
    fn test_s3_public_url() {
        let settings = StorageSettings {
            provider: StorageProvider::S3,
            bucket: Some("recap-audio".into()),
            region: "eu-west-1".into(),
            folder: "audios".into(),
        };
        let store = S3AudioStore::new(&settings);
        assert_eq!(
            store.public_url("recap-audio", "a.mp3"),
            "https://recap-audio.s3.eu-west-1.amazonaws.com/audios/a.mp3"
        );
    }

    #[tokio::test]
    async fn test_s3_without_bucket_is_storage_error() {
        let store = S3AudioStore::new(&StorageSettings::default());
        let err = store.store(Path::new("/tmp/x.mp3"), "x.mp3").await.unwrap_err();
        assert!(matches!(err, RecapError::Storage(_)));
    }
}
