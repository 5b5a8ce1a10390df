use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::instrumentation::timed;
use crate::models::{blob_key, FileRecord, FileResponse, UploadedFile};
use crate::AppState;

/// File service
///
/// Keeps the blob store and the metadata store in step. Every store failure
/// is handled here and turned into a response-level error; none escapes raw.
pub struct FileService;

impl FileService {
    /// Upload saga: write the blob, then the record. A failed record insert
    /// is compensated by deleting the blob just written.
    pub async fn upload_file(state: &AppState, file: UploadedFile) -> Result<FileResponse> {
        let sink = &*state.instrumentation;
        let owner_id = &state.config.upload.owner_id;
        let file_id = Uuid::new_v4().to_string();

        // Identifier collision probe: writing the blob first would clobber
        // the existing object at the same key.
        match timed(sink, "db.find", state.metadata.find_file(&file_id)).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                sink.increment("file.upload.id_collision");
                sink.increment("file.upload.failure");
                return Err(AppError::DependencyUnavailable(format!(
                    "identifier collision on {}",
                    file_id
                )));
            }
            Err(e) => {
                sink.increment("file.upload.failure");
                return Err(AppError::DependencyUnavailable(format!(
                    "metadata lookup before upload failed: {}",
                    e
                )));
            }
        }

        let key = blob_key(owner_id, &file_id, &file.file_name);
        let size = file.data.len();

        if let Err(e) = timed(
            sink,
            "blob.put",
            state
                .blobs
                .put(&key, file.data, file.content_type.as_deref()),
        )
        .await
        {
            sink.increment("file.upload.failure");
            return Err(AppError::DependencyUnavailable(format!(
                "blob write for {} failed: {}",
                key, e
            )));
        }

        let record = FileRecord {
            id: file_id,
            file_name: file.file_name,
            url: format!("{}/{}", state.blobs.qualifier(), key),
            upload_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        };

        if let Err(e) = timed(sink, "db.create", state.metadata.create_file(&record)).await {
            tracing::error!(
                file_id = %record.id,
                blob_key = %key,
                "Metadata insert failed, compensating: {}",
                e
            );
            Self::compensate_upload(state, &key).await;
            sink.increment("file.upload.failure");
            return Err(AppError::DependencyUnavailable(format!(
                "metadata insert for {} failed: {}",
                record.id, e
            )));
        }

        sink.increment("file.upload.success");
        tracing::info!(
            file_id = %record.id,
            blob_key = %key,
            size,
            "File uploaded"
        );
        Ok(FileResponse::from(record))
    }

    /// Best-effort removal of a blob whose record never made it in.
    /// A failure here leaves an orphaned blob and is only logged.
    async fn compensate_upload(state: &AppState, key: &str) {
        let sink = &*state.instrumentation;
        match timed(sink, "blob.delete", state.blobs.delete(key)).await {
            Ok(()) => {
                sink.increment("compensation_succeeded");
                tracing::info!(blob_key = %key, "Compensating delete removed blob");
            }
            Err(e) => {
                sink.increment("compensation_failed");
                tracing::error!(
                    blob_key = %key,
                    "Compensating delete failed, blob is orphaned: {}",
                    e
                );
            }
        }
    }

    /// Get a file record by ID
    pub async fn get_file(state: &AppState, file_id: &str) -> Result<FileResponse> {
        let record = Self::find_record(state, file_id).await?;
        state.instrumentation.increment("file.get.success");
        Ok(FileResponse::from(record))
    }

    /// Delete saga: the record is only removed once its blob is gone, so a
    /// record never outlives knowledge of where its blob lives.
    pub async fn delete_file(state: &AppState, file_id: &str) -> Result<()> {
        let sink = &*state.instrumentation;
        let record = Self::find_record(state, file_id).await?;
        let key = record.blob_key();

        if let Err(e) = timed(sink, "blob.delete", state.blobs.delete(&key)).await {
            sink.increment("file.delete.failure");
            return Err(AppError::BlobDeleteFailed(format!(
                "blob delete for {} failed, record kept: {}",
                key, e
            )));
        }

        match timed(sink, "db.delete", state.metadata.delete_file(file_id)).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(file_id = %file_id, "Record already gone after blob delete");
            }
            Err(e) => {
                sink.increment("file.delete.failure");
                tracing::error!(
                    file_id = %file_id,
                    blob_key = %key,
                    "Blob deleted but record remains: {}",
                    e
                );
                return Err(AppError::DependencyUnavailable(format!(
                    "metadata delete for {} failed: {}",
                    file_id, e
                )));
            }
        }

        sink.increment("file.delete.success");
        tracing::info!(file_id = %file_id, blob_key = %key, "File deleted");
        Ok(())
    }

    async fn find_record(state: &AppState, file_id: &str) -> Result<FileRecord> {
        let sink = &*state.instrumentation;
        match timed(sink, "db.find", state.metadata.find_file(file_id)).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => {
                sink.increment("file.not_found");
                Err(AppError::NotFound(format!("File not found: {}", file_id)))
            }
            Err(e) => Err(AppError::DependencyUnavailable(format!(
                "metadata lookup for {} failed: {}",
                file_id, e
            ))),
        }
    }
}
