use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Key-addressed binary object store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write an object, replacing any object already at `key`
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<()>;

    /// Read an object. A missing key is `AppError::NotFound`.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Leading segment of every stored url (the bucket name)
    fn qualifier(&self) -> &str;

    /// Get the storage type name
    fn storage_type(&self) -> &'static str;
}
