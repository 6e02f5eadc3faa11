//! Request spans.
//!
//! Every HTTP request handled by the server adapter gets a span carrying its
//! method, path and `x-request-id`, so log lines from the dispatcher and the
//! invoked function can be correlated.

use axum::body::Body;
use axum::http::Request;
use tracing::Span;

use crate::http::request::request_id;

/// Span factory for `TraceLayer::make_span_with`.
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()).unwrap_or("unknown"),
    )
}
