pub mod local;
pub mod provider;
pub mod s3;

pub use local::*;
pub use provider::*;
pub use s3::*;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};

/// Build the blob store selected by configuration
pub async fn build_blob_store(config: &StorageConfig) -> Arc<dyn BlobStore> {
    let store: Arc<dyn BlobStore> = match config.backend {
        StorageBackend::Local => {
            tracing::debug!("Local blob root {}", config.local_path);
            Arc::new(LocalStorage::new(&config.local_path, &config.bucket))
        }
        StorageBackend::S3 => Arc::new(S3Storage::new(config).await),
    };

    tracing::info!(
        backend = store.storage_type(),
        bucket = store.qualifier(),
        "Blob store ready"
    );
    store
}
