pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod instrumentation;
pub mod metadata;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::instrumentation::Instrumentation;
use crate::metadata::MetadataStore;
use crate::middleware::{admission_gate, request_id, track_metrics, RouteName};
use crate::storage::BlobStore;

/// Allowance for multipart framing on top of the file size ceiling
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub blobs: Arc<dyn BlobStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub instrumentation: Arc<dyn Instrumentation>,
}

pub fn create_router(state: AppState) -> Router {
    let upload_body_limit = state.config.upload.max_file_size + MULTIPART_OVERHEAD;

    let mut router = Router::new()
        .route(
            "/file",
            post(handlers::file::upload_file)
                .fallback(handlers::method_not_allowed)
                .route_layer(DefaultBodyLimit::max(upload_body_limit))
                .route_layer(axum::middleware::from_fn_with_state(
                    RouteName::FileUpload,
                    admission_gate,
                )),
        )
        .route(
            "/file/:id",
            get(handlers::file::get_file)
                .delete(handlers::file::delete_file)
                .fallback(handlers::method_not_allowed)
                .route_layer(axum::middleware::from_fn_with_state(
                    RouteName::FileItem,
                    admission_gate,
                )),
        )
        .route(
            "/healthz",
            get(handlers::health::health_check)
                .fallback(handlers::method_not_allowed)
                .route_layer(axum::middleware::from_fn_with_state(
                    RouteName::Healthz,
                    admission_gate,
                )),
        );

    // Scrape endpoint only exists when metrics are enabled
    if state.config.metrics.enabled {
        router = router.route("/metrics", get(handlers::metrics::render_metrics));
    }

    router
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.instrumentation.clone(),
            track_metrics,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id))
        .with_state(state)
}
