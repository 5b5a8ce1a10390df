//! Shared harness: a real router over SQLite and a local blob directory,
//! with switches that make individual store operations fail.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use filegate::config::Config;
use filegate::db::Database;
use filegate::error::{AppError, Result};
use filegate::instrumentation::{Instrumentation, NoopInstrumentation, PrometheusInstrumentation};
use filegate::metadata::MetadataStore;
use filegate::models::{FileRecord, HealthCheck};
use filegate::storage::{BlobStore, LocalStorage};
use filegate::{create_router, AppState};

pub const BOUNDARY: &str = "X-FILEGATE-TEST-BOUNDARY";

pub struct SwitchableBlobStore {
    inner: LocalStorage,
    pub last_put: Mutex<Option<String>>,
    pub fail_put: AtomicBool,
    pub fail_delete: AtomicBool,
}

#[async_trait]
impl BlobStore for SwitchableBlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected put failure".into()));
        }
        self.inner.put(key, data, content_type).await?;
        *self.last_put.lock().unwrap() = Some(key.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected delete failure".into()));
        }
        self.inner.delete(key).await
    }

    fn qualifier(&self) -> &str {
        self.inner.qualifier()
    }

    fn storage_type(&self) -> &'static str {
        self.inner.storage_type()
    }
}

pub struct SwitchableMetadataStore {
    inner: Database,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_health: AtomicBool,
}

#[async_trait]
impl MetadataStore for SwitchableMetadataStore {
    async fn create_file(&self, record: &FileRecord) -> Result<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected insert failure".into()));
        }
        self.inner.create_file(record).await
    }

    async fn find_file(&self, id: &str) -> Result<Option<FileRecord>> {
        self.inner.find_file(id).await
    }

    async fn delete_file(&self, id: &str) -> Result<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected delete failure".into()));
        }
        self.inner.delete_file(id).await
    }

    async fn record_health_check(&self) -> Result<HealthCheck> {
        if self.fail_health.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected health failure".into()));
        }
        self.inner.record_health_check().await
    }
}

pub struct TestServer {
    pub router: Router,
    pub blobs: Arc<SwitchableBlobStore>,
    pub metadata: Arc<SwitchableMetadataStore>,
    _dir: TempDir,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("filegate.db");
        let db = Database::new(db_path.to_str().expect("utf-8 path"))
            .await
            .expect("open database");
        db.run_migrations().await.expect("migrations");

        let blobs = Arc::new(SwitchableBlobStore {
            inner: LocalStorage::new(dir.path().join("blobs"), &config.storage.bucket),
            last_put: Mutex::new(None),
            fail_put: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        });
        let metadata = Arc::new(SwitchableMetadataStore {
            inner: db,
            fail_create: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_health: AtomicBool::new(false),
        });
        let instrumentation: Arc<dyn Instrumentation> = if config.metrics.enabled {
            Arc::new(PrometheusInstrumentation::new().expect("registry"))
        } else {
            Arc::new(NoopInstrumentation)
        };

        let state = AppState {
            config: Arc::new(config),
            blobs: blobs.clone(),
            metadata: metadata.clone(),
            instrumentation,
        };

        Self {
            router: create_router(state),
            blobs,
            metadata,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (Response<Body>, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        (Response::from_parts(parts, Body::empty()), bytes)
    }
}

pub fn fail(flag: &AtomicBool) {
    flag.store(true, Ordering::SeqCst);
}

/// Build a multipart body from `(field, file_name, content)` file parts.
pub fn multipart_body(files: &[(&str, &str, &str)]) -> String {
    let mut body = String::new();
    for (field, file_name, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub fn upload_request(files: &[(&str, &str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/file")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("user-agent", "filegate-tests")
        .body(Body::from(multipart_body(files)))
        .unwrap()
}

pub fn bare_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
