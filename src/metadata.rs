use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FileRecord, HealthCheck};

/// Relational store holding one row per stored object
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a new file record
    async fn create_file(&self, record: &FileRecord) -> Result<()>;

    /// Point lookup by identifier
    async fn find_file(&self, id: &str) -> Result<Option<FileRecord>>;

    /// Delete a file record, returning whether a row was removed
    async fn delete_file(&self, id: &str) -> Result<bool>;

    /// Append a liveness sentinel row
    async fn record_health_check(&self) -> Result<HealthCheck>;
}
