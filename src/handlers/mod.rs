pub mod file;
pub mod health;
pub mod metrics;

use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Fallback for a known path with an unsupported method
pub async fn method_not_allowed() -> Response {
    AppError::MethodNotAllowed.into_response()
}

/// Fallback for unmatched routes
pub async fn not_found() -> Response {
    AppError::NotFound("no such route".to_string()).into_response()
}
