use axum::{
    extract::{multipart::MultipartRejection, rejection::PathRejection, Multipart, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::error::{empty_response, AppError, Result};
use crate::models::FileResponse;
use crate::services::{FileService, UploadForm};
use crate::AppState;

/// Upload a file
/// POST /file
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<FileResponse>)> {
    let multipart = multipart
        .map_err(|e| AppError::MalformedRequest(format!("Invalid upload body: {}", e)))?;

    let form = UploadForm::collect(multipart, state.config.upload.max_file_size).await?;
    let file = form.into_single_file()?;

    let created = FileService::upload_file(&state, file).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a file record
/// GET /file/:id
pub async fn get_file(
    State(state): State<AppState>,
    id: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<FileResponse>> {
    let id = file_id(id)?;
    let file = FileService::get_file(&state, &id).await?;
    Ok(Json(file))
}

/// Delete a file
/// DELETE /file/:id
pub async fn delete_file(
    State(state): State<AppState>,
    id: std::result::Result<Path<String>, PathRejection>,
) -> Result<Response> {
    let id = file_id(id)?;
    FileService::delete_file(&state, &id).await?;
    Ok(empty_response(StatusCode::NO_CONTENT))
}

/// Unwrap the `:id` segment; an undecodable segment is a malformed request
fn file_id(id: std::result::Result<Path<String>, PathRejection>) -> Result<String> {
    id.map(|Path(id)| id)
        .map_err(|e| AppError::MalformedRequest(format!("Invalid file id: {}", e.body_text())))
}
