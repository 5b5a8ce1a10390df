use serde::Serialize;
use sqlx::FromRow;

/// File record - one row per stored object
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct FileRecord {
    pub id: String,
    pub file_name: String,
    /// Fully qualified location: `{bucket}/{blob_key}`
    pub url: String,
    /// Calendar date, `YYYY-MM-DD`
    pub upload_date: String,
}

impl FileRecord {
    /// Recover the blob key by dropping the leading store qualifier segment.
    pub fn blob_key(&self) -> String {
        self.url.split('/').skip(1).collect::<Vec<_>>().join("/")
    }
}

/// File response body shared by upload and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResponse {
    pub file_name: String,
    pub id: String,
    pub url: String,
    pub upload_date: String,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            file_name: file.file_name,
            id: file.id,
            url: file.url,
            upload_date: file.upload_date,
        }
    }
}

/// A single file taken from an upload form, held in memory for one request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: bytes::Bytes,
}

/// Compose the blob key for a new object.
pub fn blob_key(owner_id: &str, file_id: &str, file_name: &str) -> String {
    format!("{}/{}-{}", owner_id, file_id, file_name)
}
