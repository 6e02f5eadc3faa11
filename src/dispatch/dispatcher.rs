//! The dispatch algorithm shared by every host.
//!
//! # Responsibilities
//! - Match a request against the route table (registration order, first wins)
//! - Extract and percent-decode path arguments in parameter order
//! - Append the JSON body for POST and PUT
//! - Invoke the function and render a JSON response
//!
//! # Design Decisions
//! - Unmatched → 404 `{"error":"Not found"}`
//! - Handler failure (or panic) → 500 `{"error": message}`; never fatal
//! - No retries and no fallback to another implementation

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use futures_util::future::FutureExt;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::dispatch::request::{IncomingRequest, OutgoingResponse};
use crate::function::{Args, InvocationContext, InvokeError, InvokeResult};
use crate::observability::metrics;
use crate::routing::{ApiContainer, RouteEntry};

/// A route that accepted a request, with its raw path captures.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub captures: Vec<String>,
}

/// Dispatches requests into one container.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    container: Arc<ApiContainer>,
}

impl Dispatcher {
    pub fn new(container: Arc<ApiContainer>) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &Arc<ApiContainer> {
        &self.container
    }

    /// First route, in registration order, accepting `method` and `path`.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.container.entries().find_map(|entry| {
            entry
                .pattern
                .matches(method, path)
                .map(|captures| RouteMatch { entry, captures })
        })
    }

    /// Run one request to completion.
    pub async fn dispatch(&self, request: IncomingRequest) -> OutgoingResponse {
        let start = Instant::now();
        let method = request.method.to_string();

        let Some(matched) = self.match_route(&request.method, &request.path) else {
            tracing::warn!(
                container = %self.container.id(),
                method = %method,
                path = %request.path,
                "No route matched"
            );
            metrics::record_request(&method, 404, "none", start);
            return OutgoingResponse::not_found();
        };

        let route = matched.entry.name.clone();
        let response = match invoke_matched(matched, &request).await {
            Ok(value) => OutgoingResponse::ok(value),
            Err(e) => {
                tracing::error!(
                    container = %self.container.id(),
                    route = %route,
                    method = %method,
                    path = %request.path,
                    error = %e,
                    "Handler failed"
                );
                OutgoingResponse::internal_error(e.to_string())
            }
        };

        metrics::record_request(&method, response.status.as_u16(), &route, start);
        response
    }
}

/// Build the positional argument list for a matched request.
pub fn extract_args(matched: &RouteMatch<'_>, body: &[u8]) -> InvokeResult<Args> {
    let pattern = &matched.entry.pattern;
    let mut args: Args = Vec::with_capacity(matched.captures.len() + 1);

    for (name, raw) in pattern.param_names().iter().zip(&matched.captures) {
        let invalid = || InvokeError::Decode(format!("Invalid encoding in path parameter '{}'", name));
        if !escapes_well_formed(raw) {
            return Err(invalid());
        }
        let decoded = percent_decode_str(raw).decode_utf8().map_err(|_| invalid())?;
        args.push(Value::String(decoded.into_owned()));
    }

    if pattern.takes_body() {
        let body = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(body)?
        };
        args.push(body);
    }

    Ok(args)
}

/// Every `%` must introduce two hex digits; `percent_decode_str` would pass
/// a stray `%` through as literal text.
fn escapes_well_formed(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

async fn invoke_matched(matched: RouteMatch<'_>, request: &IncomingRequest) -> InvokeResult {
    let args = extract_args(&matched, &request.body)?;
    let ctx = InvocationContext::for_request(request.url.clone().unwrap_or_else(|| request.path.clone()));
    let entry = matched.entry;

    tracing::debug!(route = %entry.name, function = %entry.handler.id(), args = ?args, "Invoking");

    AssertUnwindSafe(entry.handler.invoke_with_context(args, ctx))
        .catch_unwind()
        .await
        .map_err(|_| InvokeError::Panicked(entry.handler.id().to_string()))?
}
