//! Request Logging Middleware
//!
//! Request spans come from `tower-http`'s [`TraceLayer`]. The access log line
//! and the HTTP metrics are produced by [`track_requests`].
//!
//! Clients poll their live position and run throughput probes many times per
//! second, so those paths log at TRACE instead of DEBUG.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http,
    middleware::Next,
    response::Response,
};
use tower_http::trace::{HttpMakeClassifier, TraceLayer};
use tracing::Span;

use crate::infrastructure::metrics;

/// Path prefixes logged at TRACE.
pub const QUIET_PATHS: &[&str] = &[
    "/save_user_location",
    "/get-live-location",
    "/backend/garbage",
    "/backend/empty",
];

/// Whether requests to `path` are too frequent for the default log level.
pub fn is_quiet_path(path: &str) -> bool {
    QUIET_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

fn make_request_span(request: &http::Request<Body>) -> Span {
    let method = request.method();
    let path = request.uri().path();

    if is_quiet_path(path) {
        tracing::trace_span!("request", %method, path)
    } else {
        tracing::debug_span!("request", %method, path)
    }
}

/// Create the request tracing layer
pub fn create_trace_layer(
) -> TraceLayer<HttpMakeClassifier, fn(&http::Request<Body>) -> Span, (), ()> {
    TraceLayer::new_for_http()
        .make_span_with(make_request_span as fn(&http::Request<Body>) -> Span)
        .on_request(())
        .on_response(())
}

/// Log each completed request and record it in the HTTP metrics.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    // Route templates keep metric label cardinality bounded
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics::record_http_request(method.as_str(), &route, status, elapsed.as_secs_f64());

    let latency_ms = elapsed.as_millis() as u64;
    if is_quiet_path(&path) {
        tracing::trace!(%method, path = %path, status, latency_ms, "request completed");
    } else {
        tracing::debug!(%method, path = %path, status, latency_ms, "request completed");
    }

    response
}
