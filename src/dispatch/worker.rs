//! Worker-style fetch adapter.
//!
//! Maps an `http::Request<Bytes>` (absolute or origin-form URI) onto the
//! dispatcher and renders an `http::Response<Bytes>`, the shape a
//! platform-worker `fetch` entry point works with.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderValue, Request, Response};

use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::request::{IncomingRequest, OutgoingResponse};
use crate::routing::ApiContainer;

/// Fetch handler built from a container.
#[derive(Debug, Clone)]
pub struct WorkerHandler {
    dispatcher: Dispatcher,
}

impl WorkerHandler {
    pub fn new(container: Arc<ApiContainer>) -> Self {
        Self {
            dispatcher: Dispatcher::new(container),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one request.
    pub async fn fetch(&self, request: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();
        let incoming = IncomingRequest {
            method: parts.method,
            path: parts.uri.path().to_string(),
            body,
            url: Some(parts.uri.to_string()),
        };
        render(self.dispatcher.dispatch(incoming).await)
    }
}

/// Render a dispatcher response as a JSON `http::Response`.
pub fn render(response: OutgoingResponse) -> Response<Bytes> {
    let mut out = Response::new(response.body_bytes());
    *out.status_mut() = response.status;
    out.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{handler, Function};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    fn worker() -> WorkerHandler {
        let mut c = ApiContainer::new("api");
        c.add_route(
            "hello",
            "GET /v1/api/hello/{name}",
            Arc::new(Function::new(
                "hello-handler",
                handler(|args| async move {
                    let name = args[0].as_str().unwrap_or_default().to_string();
                    Ok(json!(format!("Hello, {}!", name)))
                }),
            )),
        )
        .unwrap();
        WorkerHandler::new(Arc::new(c))
    }

    #[tokio::test]
    async fn test_absolute_url() {
        let req = Request::builder()
            .uri("https://api.example.workers.dev/v1/api/hello/Ada?x=1")
            .body(Bytes::new())
            .unwrap();
        let res = worker().fetch(req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, json!("Hello, Ada!"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/v1/api/hello/Ada")
            .body(Bytes::new())
            .unwrap();
        let res = worker().fetch(req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body().as_ref(), br#"{"error":"Not found"}"#);
    }
}
