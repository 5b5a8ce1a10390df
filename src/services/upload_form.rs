use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::BytesMut;

use crate::error::{AppError, Result};
use crate::models::UploadedFile;

/// Form field that must carry the uploaded file
pub const FILE_FIELD: &str = "file";

/// Per-request state gathered while reading an upload form.
///
/// The first file part is kept; any later file part only raises
/// `multiple_files_attempted` and is skipped without being read.
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<UploadedFile>,
    multiple_files_attempted: bool,
}

impl UploadForm {
    /// Read the whole multipart stream
    pub async fn collect(mut multipart: Multipart, max_file_size: usize) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            form.accept_field(field, max_file_size).await?;
        }

        Ok(form)
    }

    async fn accept_field(&mut self, mut field: Field<'_>, max_file_size: usize) -> Result<()> {
        // Text fields are ignored
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Ok(()),
        };

        if self.file.is_some() {
            tracing::debug!("Discarding extra file part {:?}", file_name);
            self.multiple_files_attempted = true;
            return Ok(());
        }

        if !is_safe_file_name(&file_name) {
            return Err(AppError::MalformedRequest(format!(
                "file name {:?} has a relative path segment",
                file_name
            )));
        }

        if field.name() != Some(FILE_FIELD) {
            return Err(AppError::MalformedRequest(format!(
                "unexpected file field {:?}",
                field.name().unwrap_or("")
            )));
        }

        let content_type = field.content_type().map(|s| s.to_string());
        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > max_file_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "{} exceeds {} bytes",
                    file_name, max_file_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        self.file = Some(UploadedFile {
            file_name,
            content_type,
            data: data.freeze(),
        });
        Ok(())
    }

    pub fn multiple_files_attempted(&self) -> bool {
        self.multiple_files_attempted
    }

    /// The single accepted file, or a rejection
    pub fn into_single_file(self) -> Result<UploadedFile> {
        if self.multiple_files_attempted {
            return Err(AppError::MalformedRequest(
                "more than one file in upload".to_string(),
            ));
        }
        self.file
            .ok_or_else(|| AppError::MalformedRequest("no file provided".to_string()))
    }
}

/// A file name becomes the tail of a blob key, so no segment after a slash
/// or backslash may be `.` or `..`
fn is_safe_file_name(name: &str) -> bool {
    name.split(['/', '\\'])
        .skip(1)
        .all(|segment| segment != "." && segment != "..")
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::MalformedRequest(format!("Failed to process multipart: {}", e.body_text()))
    }
}
