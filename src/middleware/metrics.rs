use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::instrumentation::Instrumentation;

/// Time every request and count responses by method and status
pub async fn track_metrics(
    State(sink): State<Arc<dyn Instrumentation>>,
    request: Request,
    next: Next,
) -> Response {
    let method = method_label(request.method());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    sink.observe(&format!("api.request.time.{}", method), started.elapsed());
    sink.increment(&format!("api.response.count.{}", method));
    sink.increment(&format!("api.response.status.{}", status));
    sink.increment(&format!("api.response.status.{}xx", status / 100));

    response
}

/// Label for a request method. Extension methods share one label so clients
/// cannot mint new series.
fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "get",
        Method::POST => "post",
        Method::PUT => "put",
        Method::PATCH => "patch",
        Method::DELETE => "delete",
        Method::HEAD => "head",
        Method::OPTIONS => "options",
        _ => "other",
    }
}
