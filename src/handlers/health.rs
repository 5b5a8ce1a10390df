use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::empty_response;
use crate::services::HealthService;
use crate::AppState;

/// Liveness probe
/// GET /healthz
pub async fn health_check(State(state): State<AppState>) -> Response {
    let mut response = match HealthService::check(&state).await {
        Ok(()) => empty_response(StatusCode::OK),
        Err(e) => e.into_response(),
    };

    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
