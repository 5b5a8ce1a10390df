use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::empty_response;
use crate::AppState;

/// Prometheus scrape endpoint
/// GET /metrics
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match state.instrumentation.render() {
        Some(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        None => empty_response(StatusCode::NOT_FOUND),
    }
}
