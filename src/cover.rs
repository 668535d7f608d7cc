//! Cover image storage. Books keep only the storage key; bytes live in a
//! local directory or an S3 bucket.

use crate::error::AppError;
use crate::settings::{CoverBackend, CoverConfig};
use crate::validation::ValidationErrors;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub const ACCEPTED_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// An uploaded image, as received from the multipart form.
#[derive(Clone, Debug)]
pub struct CoverUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn map_cover_extension(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

pub fn content_type_for_key(key: &str) -> &'static str {
    if key.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

impl CoverUpload {
    /// Type and size check; returns the file extension to store under.
    pub fn check(&self, max_bytes: usize) -> Result<&'static str, AppError> {
        let Some(ext) = map_cover_extension(&self.content_type) else {
            return Err(ValidationErrors::single(
                "cover",
                format!("cover must be one of: {}", ACCEPTED_TYPES.join(", ")),
            )
            .into());
        };
        if self.bytes.is_empty() {
            return Err(ValidationErrors::single("cover", "cover is empty").into());
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "cover is {} bytes, limit is {}",
                self.bytes.len(),
                max_bytes
            )));
        }
        Ok(ext)
    }
}

/// A fresh key per upload, so replacing a cover never overwrites the old
/// object before it is deleted.
pub fn cover_key(owner: &str, book_id: Uuid, ext: &str) -> String {
    let owner: String = owner
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}/{}/{}.{}", owner, book_id, Uuid::new_v4(), ext)
}

#[async_trait]
pub trait CoverStore: Send + Sync {
    async fn put(&self, key: &str, upload: &CoverUpload) -> Result<(), AppError>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;
    /// Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

pub struct LocalCoverStore {
    root: PathBuf,
}

impl LocalCoverStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalCoverStore { root: root.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, AppError> {
        if key.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(AppError::Storage(format!("invalid cover key: {}", key)));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl CoverStore for LocalCoverStore {
    async fn put(&self, key: &str, upload: &CoverUpload) -> Result<(), AppError> {
        let path = self.path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(key, bytes = upload.bytes.len(), "cover stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("{}: {}", path.display(), e))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("{}: {}", path.display(), e))),
        }
    }
}

pub struct S3CoverStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
}

impl S3CoverStore {
    /// Credentials and region come from the standard AWS environment chain.
    pub async fn from_env(bucket: String, prefix: String) -> Self {
        let sdk = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        S3CoverStore {
            client: aws_sdk_s3::Client::new(&sdk),
            bucket,
            prefix,
        }
    }

    fn object_key(&self, key: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", prefix, key)
        }
    }
}

#[async_trait]
impl CoverStore for S3CoverStore {
    async fn put(&self, key: &str, upload: &CoverUpload) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.bytes.clone()))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("s3 put {}: {}", key, e)))?;
        tracing::debug!(key, bucket = %self.bucket, "cover stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let out = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) if e.as_service_error().is_some_and(|s| s.is_no_such_key()) => return Ok(None),
            Err(e) => return Err(AppError::Storage(format!("s3 get {}: {}", key, e))),
        };
        let data = out
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("s3 read {}: {}", key, e)))?;
        Ok(Some(data.into_bytes().to_vec()))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("s3 delete {}: {}", key, e)))?;
        Ok(())
    }
}

pub async fn from_config(config: &CoverConfig) -> Arc<dyn CoverStore> {
    match &config.backend {
        CoverBackend::Local { dir } => {
            tracing::info!(dir = %dir.display(), "covers stored on local disk");
            Arc::new(LocalCoverStore::new(dir.clone()))
        }
        CoverBackend::S3 { bucket, prefix } => {
            tracing::info!(bucket = %bucket, prefix = %prefix, "covers stored in s3");
            Arc::new(S3CoverStore::from_env(bucket.clone(), prefix.clone()).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, len: usize) -> CoverUpload {
        CoverUpload {
            content_type: content_type.into(),
            bytes: vec![0xff; len],
        }
    }

    #[test]
    fn only_jpeg_and_png_within_limit() {
        assert_eq!(upload("image/jpeg", 10).check(100).unwrap(), "jpg");
        assert_eq!(upload("image/png", 100).check(100).unwrap(), "png");
        assert!(matches!(upload("image/gif", 10).check(100), Err(AppError::Validation(_))));
        assert!(matches!(upload("image/png", 101).check(100), Err(AppError::PayloadTooLarge(_))));
    }

    #[test]
    fn keys_are_path_safe_and_unique() {
        let id = Uuid::new_v4();
        let a = cover_key("../ana", id, "jpg");
        let b = cover_key("../ana", id, "jpg");
        assert!(a.starts_with(&format!("___ana/{}/", id)));
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn local_store_round_trip_and_idempotent_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalCoverStore::new(dir.path());
        let key = cover_key("ana", Uuid::new_v4(), "png");
        store.put(&key, &upload("image/png", 16)).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().map(|b| b.len()), Some(16));
        store.delete(&key).await.unwrap();
        assert!(store.get(&key).await.unwrap().is_none());
        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn local_store_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalCoverStore::new(dir.path());
        assert!(store.get("../etc/passwd").await.is_err());
    }
}
