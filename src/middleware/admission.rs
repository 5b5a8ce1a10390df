//! Request admission gate.
//!
//! Every routed request passes through [`admission_gate`] before its handler
//! runs. What a route accepts is fixed in one policy table keyed by
//! [`RouteName`].

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, Result};

/// Largest body read while checking that a bodiless route got no body
const BODY_PROBE_LIMIT: usize = 64 * 1024;

/// Headers any client or proxy in front of us may send
const READ_HEADERS: &[&str] = &[
    "accept",
    "accept-encoding",
    "cache-control",
    "connection",
    "host",
    "postman-token",
    "user-agent",
    "forwarded",
    "via",
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-port",
    "x-forwarded-proto",
    "x-real-ip",
    "x-amzn-trace-id",
];

const UPLOAD_HEADERS: &[&str] = &[
    "accept",
    "accept-encoding",
    "cache-control",
    "connection",
    "host",
    "postman-token",
    "user-agent",
    "forwarded",
    "via",
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-port",
    "x-forwarded-proto",
    "x-real-ip",
    "x-amzn-trace-id",
    "content-type",
    "content-length",
    "expect",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    /// POST /file
    FileUpload,
    /// GET, DELETE /file/:id
    FileItem,
    /// GET /healthz
    Healthz,
}

/// What one route admits
#[derive(Debug)]
pub struct RoutePolicy {
    pub methods: &'static [&'static str],
    pub allowed_headers: &'static [&'static str],
    pub allows_body: bool,
}

impl RoutePolicy {
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.contains(&method)
    }

    pub fn allows_header(&self, name: &str) -> bool {
        self.allowed_headers
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(name))
    }
}

static ROUTE_POLICIES: [(RouteName, RoutePolicy); 3] = [
    (
        RouteName::FileUpload,
        RoutePolicy {
            methods: &["POST"],
            allowed_headers: UPLOAD_HEADERS,
            allows_body: true,
        },
    ),
    (
        RouteName::FileItem,
        RoutePolicy {
            methods: &["GET", "DELETE"],
            allowed_headers: READ_HEADERS,
            allows_body: false,
        },
    ),
    (
        RouteName::Healthz,
        RoutePolicy {
            methods: &["GET"],
            allowed_headers: READ_HEADERS,
            allows_body: false,
        },
    ),
];

impl RouteName {
    /// Entries in `ROUTE_POLICIES` are ordered by discriminant
    pub fn policy(self) -> &'static RoutePolicy {
        &ROUTE_POLICIES[self as usize].1
    }
}

/// Middleware rejecting requests outside the route's policy
pub async fn admission_gate(
    State(route): State<RouteName>,
    request: Request,
    next: Next,
) -> Response {
    match admit(route.policy(), request).await {
        Ok(request) => next.run(request).await,
        Err(e) => {
            tracing::debug!(route = ?route, "Request refused at admission: {}", e);
            e.into_response()
        }
    }
}

/// Check a request against a policy. An admitted bodiless request is handed
/// back with its (empty) body already drained.
pub async fn admit(policy: &RoutePolicy, request: Request) -> Result<Request> {
    if !policy.allows_method(request.method().as_str()) {
        return Err(AppError::MethodNotAllowed);
    }

    if let Some(name) = request
        .headers()
        .keys()
        .find(|name| !policy.allows_header(name.as_str()))
    {
        return Err(AppError::MalformedRequest(format!(
            "header not allowed: {}",
            name
        )));
    }

    if policy.allows_body {
        return Ok(request);
    }

    if request.headers().contains_key(header::CONTENT_TYPE) {
        return Err(AppError::MalformedRequest(
            "content-type on a bodiless route".to_string(),
        ));
    }

    if request.uri().query().is_some_and(|q| !q.is_empty()) {
        return Err(AppError::MalformedRequest(
            "query string on a bodiless route".to_string(),
        ));
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, BODY_PROBE_LIMIT)
        .await
        .map_err(|e| AppError::MalformedRequest(format!("unreadable body: {}", e)))?;
    if !bytes.is_empty() {
        return Err(AppError::MalformedRequest(format!(
            "{} byte body on a bodiless route",
            bytes.len()
        )));
    }

    Ok(Request::from_parts(parts, Body::empty()))
}
