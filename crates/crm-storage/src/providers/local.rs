//! Local filesystem storage provider.
//!
//! Each bucket is a directory directly under the root; objects are files
//! inside it.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, info};

use crm_core::error::{AppError, ErrorKind};
use crm_core::result::AppResult;
use crm_core::traits::storage::{StorageProvider, StoredObject};

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory holding one directory per bucket.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    fn bucket_dir(&self, bucket: &str) -> AppResult<PathBuf> {
        if bucket.is_empty() || !is_plain_relative(Path::new(bucket)) || bucket.contains('/') {
            return Err(AppError::validation(format!("Invalid bucket name: '{bucket}'")));
        }
        Ok(self.root.join(bucket))
    }

    /// Resolve an object path, rejecting anything that escapes the bucket.
    fn resolve(&self, bucket: &str, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if path.trim_start_matches('/').is_empty() || !is_plain_relative(relative) {
            return Err(AppError::validation(format!("Invalid object path: '{path}'")));
        }
        Ok(self.bucket_dir(bucket)?.join(relative))
    }

    async fn require_bucket(&self, bucket: &str) -> AppResult<PathBuf> {
        let dir = self.bucket_dir(bucket)?;
        if fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            Ok(dir)
        } else {
            Err(AppError::bucket_not_found(bucket))
        }
    }
}

fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn io_error(action: &str, target: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Object not found: {target}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {target}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn bucket_exists(&self, bucket: &str) -> AppResult<bool> {
        match self.require_bucket(bucket).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind == ErrorKind::BucketNotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_bucket(&self, bucket: &str) -> AppResult<()> {
        let dir = self.bucket_dir(bucket)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error("create bucket", bucket, e))?;
        info!(bucket, "Created storage bucket");
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        mime_type: &str,
    ) -> AppResult<StoredObject> {
        self.require_bucket(bucket).await?;
        let full_path = self.resolve(bucket, path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory", path, e))?;
        }

        fs::write(&full_path, &data)
            .await
            .map_err(|e| io_error("write object", path, e))?;

        debug!(bucket, path, bytes = data.len(), "Stored object");
        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: path.trim_start_matches('/').to_string(),
            size_bytes: data.len() as u64,
            mime_type: mime_type.to_string(),
        })
    }

    async fn get_object(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        self.require_bucket(bucket).await?;
        let full_path = self.resolve(bucket, path)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| io_error("read object", path, e))?;
        Ok(Bytes::from(data))
    }

    async fn delete_object(&self, bucket: &str, path: &str) -> AppResult<()> {
        self.require_bucket(bucket).await?;
        let full_path = self.resolve(bucket, path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete object", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider() -> (tempfile::TempDir, LocalStorageProvider) {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        (dir, provider)
    }

    #[tokio::test]
    async fn test_put_into_missing_bucket_fails() {
        let (_dir, provider) = provider().await;
        let err = provider
            .put_object("teasers", "a/b.pdf", Bytes::from("x"), "application/pdf")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BucketNotFound);
        assert!(!provider.bucket_exists("teasers").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let (_dir, provider) = provider().await;
        provider.create_bucket("teasers").await.unwrap();

        let data = Bytes::from("teaser body");
        let stored = provider
            .put_object("teasers", "lead/file.pdf", data.clone(), "application/pdf")
            .await
            .unwrap();
        assert_eq!(stored.size_bytes, data.len() as u64);
        assert_eq!(stored.path, "lead/file.pdf");

        assert_eq!(provider.get_object("teasers", "lead/file.pdf").await.unwrap(), data);

        provider.delete_object("teasers", "lead/file.pdf").await.unwrap();
        let err = provider
            .get_object("teasers", "lead/file.pdf")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let (_dir, provider) = provider().await;
        provider.create_bucket("teasers").await.unwrap();
        let err = provider
            .put_object("teasers", "../outside.pdf", Bytes::from("x"), "application/pdf")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(provider.create_bucket("../up").await.is_err());
    }
}
