//! Request middleware: CORS, request ids and access logging.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Method, Request, Response};
use axum::middleware::Next;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, info};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Probes and scrapes are logged at debug only.
const QUIET_PATHS: [&str; 2] = ["/health", "/metrics"];

const CORS_MAX_AGE: Duration = Duration::from_secs(600);

/// Id of the request being served, available as an extension to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// CORS for `origins`; a `*` entry opens the API to any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::very_permissive().max_age(CORS_MAX_AGE);
    }

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        // Downloads name their file through Content-Disposition.
        .expose_headers([header::CONTENT_DISPOSITION, REQUEST_ID_HEADER.clone()])
        .max_age(CORS_MAX_AGE)
}

/// Reuse the caller's `x-request-id` or mint one, and echo it on the response.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response<Body> {
    let id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

/// One access-log line per request.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();
    let started = Instant::now();

    let response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if QUIET_PATHS.contains(&path.as_str()) {
        debug!(%method, %path, status, elapsed_ms, "request");
    } else {
        info!(request_id = %id, %method, %path, status, elapsed_ms, "request");
    }
    response
}
