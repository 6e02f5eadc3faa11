//! Overloads that forward a call to a bound endpoint.
//!
//! # Responsibilities
//! - Substitute path placeholders left-to-right with the leading arguments
//! - Send the next argument as a JSON body for POST and PUT
//! - Turn non-success statuses into descriptive errors
//!
//! # Design Decisions
//! - Arguments are percent-encoded with the `encodeURIComponent` character set
//! - String arguments are used verbatim; other JSON values by their JSON text
//! - A missing argument leaves its `{name}` placeholder in the URL
//! - Only the transport differs between HTTP, service and test bindings

use std::sync::Arc;
use std::time::Instant;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::binding::registry::ServiceEndpoint;
use crate::binding::transport::{Transport, TransportRequest};
use crate::function::{handler, Args, Handler, InvokeError, InvokeResult};
use crate::observability::metrics;
use crate::routing::{ApiContainer, RouteResult, RoutePattern};

/// Characters left unescaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build a handler that calls route `route_name` of `container` at `endpoint`.
///
/// Fails up front if the container has no such route.
pub fn http_handler(
    endpoint: &ServiceEndpoint,
    container: &ApiContainer,
    route_name: &str,
    transport: Arc<dyn Transport>,
) -> RouteResult<Handler> {
    let pattern = Arc::new(container.get_route(route_name)?.pattern.clone());
    let base_url: Arc<str> = Arc::from(endpoint.base_url());

    Ok(handler(move |args| {
        let pattern = pattern.clone();
        let base_url = base_url.clone();
        let transport = transport.clone();
        async move { remote_call(&base_url, &pattern, transport.as_ref(), args).await }
    }))
}

/// Encode one argument as a path segment.
pub fn encode_component(value: &Value) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    utf8_percent_encode(&raw, COMPONENT).to_string()
}

/// Build the outbound request for `args` against `pattern`.
pub fn build_request(base_url: &str, pattern: &RoutePattern, args: &Args) -> TransportRequest {
    let n = pattern.param_names().len();
    let values: Vec<Option<String>> = (0..n).map(|i| args.get(i).map(encode_component)).collect();
    let url = format!("{}{}", base_url.trim_end_matches('/'), pattern.fill(&values));
    let body = if pattern.takes_body() { args.get(n).cloned() } else { None };

    TransportRequest {
        method: pattern.method().clone(),
        url,
        body,
    }
}

async fn remote_call(
    base_url: &str,
    pattern: &RoutePattern,
    transport: &dyn Transport,
    args: Args,
) -> InvokeResult {
    let request = build_request(base_url, pattern, &args);
    let method = request.method.to_string();
    let url = request.url.clone();
    let start = Instant::now();

    tracing::debug!(method = %method, url = %url, has_body = request.body.is_some(), "Remote call");

    let response = match transport.send(request).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(method = %method, url = %url, error = %e, "Remote call failed");
            metrics::record_remote_call(&method, 0, start);
            return Err(e);
        }
    };
    metrics::record_remote_call(&method, response.status.as_u16(), start);

    if !response.status.is_success() {
        let body = String::from_utf8_lossy(&response.body).into_owned();
        tracing::warn!(method = %method, url = %url, status = %response.status, "Remote call returned error status");
        return Err(InvokeError::Remote {
            method,
            url,
            status: response.status.as_u16(),
            body,
        });
    }

    if response.body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body)
        .map_err(|e| InvokeError::Decode(format!("Invalid JSON from {}: {}", url, e)))
}
