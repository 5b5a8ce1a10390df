//! In-memory stores with switchable failures for unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::instrumentation::{Instrumentation, PrometheusInstrumentation};
use crate::metadata::MetadataStore;
use crate::models::{FileRecord, HealthCheck};
use crate::storage::BlobStore;
use crate::AppState;

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Bytes>>,
    pub fail_put: AtomicBool,
    pub fail_delete: AtomicBool,
    pub delete_calls: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: Option<&str>) -> Result<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(AppError::Storage("put refused".into()));
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Storage("delete refused".into()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn qualifier(&self) -> &str {
        "test-bucket"
    }

    fn storage_type(&self) -> &'static str {
        "memory"
    }
}

#[derive(Default)]
pub struct MemoryMetadataStore {
    files: Mutex<HashMap<String, FileRecord>>,
    checks: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_find: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_health: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn insert(&self, record: FileRecord) {
        self.files
            .lock()
            .unwrap()
            .insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn create_file(&self, record: &FileRecord) -> Result<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::Storage("insert refused".into()));
        }
        self.insert(record.clone());
        Ok(())
    }

    async fn find_file(&self, id: &str) -> Result<Option<FileRecord>> {
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(AppError::Storage("lookup refused".into()));
        }
        Ok(self.files.lock().unwrap().get(id).cloned())
    }

    async fn delete_file(&self, id: &str) -> Result<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Storage("delete refused".into()));
        }
        Ok(self.files.lock().unwrap().remove(id).is_some())
    }

    async fn record_health_check(&self) -> Result<HealthCheck> {
        if self.fail_health.load(Ordering::SeqCst) {
            return Err(AppError::Storage("health insert refused".into()));
        }
        let check_id = self.checks.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        Ok(HealthCheck {
            check_id,
            checked_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

pub struct Harness {
    pub blobs: Arc<MemoryBlobStore>,
    pub metadata: Arc<MemoryMetadataStore>,
    pub sink: Arc<PrometheusInstrumentation>,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        let blobs = Arc::new(MemoryBlobStore::default());
        let metadata = Arc::new(MemoryMetadataStore::default());
        let sink = Arc::new(PrometheusInstrumentation::new().unwrap());
        let state = AppState {
            config: Arc::new(Config::default()),
            blobs: blobs.clone(),
            metadata: metadata.clone(),
            instrumentation: sink.clone(),
        };
        Self {
            blobs,
            metadata,
            sink,
            state,
        }
    }

    pub fn metrics(&self) -> String {
        self.sink.render().unwrap_or_default()
    }
}

pub fn fail(flag: &AtomicBool) {
    flag.store(true, Ordering::SeqCst);
}
