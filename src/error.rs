use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Application error type
///
/// Every variant renders as a bodiless response. The message carried by a
/// variant is for the log only and never reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Blob delete failed: {0}")]
    BlobDeleteFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BlobDeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) | AppError::Storage(_) | AppError::Io(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Build a response with no body and an explicit zero content length.
pub fn empty_response(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, header::HeaderValue::from_static("0"));
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MalformedRequest(msg) => tracing::debug!("Rejected request: {}", msg),
            AppError::NotFound(msg) => tracing::debug!("Not found: {}", msg),
            AppError::MethodNotAllowed => tracing::debug!("Method not allowed"),
            AppError::PayloadTooLarge(msg) => tracing::warn!("Payload too large: {}", msg),
            AppError::DependencyUnavailable(msg) => {
                tracing::error!("Dependency unavailable: {}", msg)
            }
            AppError::BlobDeleteFailed(msg) => tracing::error!("Blob delete failed: {}", msg),
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Storage(msg) => tracing::error!("Storage error: {}", msg),
            AppError::Io(e) => tracing::error!("IO error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
        }

        empty_response(self.status())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_faults_map_to_service_unavailable() {
        assert_eq!(
            AppError::DependencyUnavailable("db".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Storage("s3".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::BlobDeleteFailed("s3".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_response_has_no_body() {
        let response = AppError::MalformedRequest("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            "0"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }
}
