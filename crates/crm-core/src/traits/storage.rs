//! Storage provider trait for bucket-based document storage.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredObject {
    /// Bucket the object lives in.
    pub bucket: String,
    /// Path within the bucket.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type recorded at upload time.
    pub mime_type: String,
}

/// Trait for document storage backends.
///
/// Writes into a bucket that does not exist fail with
/// [`ErrorKind::BucketNotFound`](crate::error::ErrorKind::BucketNotFound)
/// so callers can decide whether to create it.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether a bucket exists.
    async fn bucket_exists(&self, bucket: &str) -> AppResult<bool>;

    /// Create a bucket. Creating an existing bucket is not an error.
    async fn create_bucket(&self, bucket: &str) -> AppResult<()>;

    /// Write bytes to `path` inside `bucket`.
    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        mime_type: &str,
    ) -> AppResult<StoredObject>;

    /// Read an object back.
    async fn get_object(&self, bucket: &str, path: &str) -> AppResult<Bytes>;

    /// Delete an object.
    async fn delete_object(&self, bucket: &str, path: &str) -> AppResult<()>;
}
