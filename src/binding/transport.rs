//! Low-level transports used by remote overloads.
//!
//! The remote-call builder only knows how to turn arguments into a
//! [`TransportRequest`] and a [`TransportResponse`] back into a value. The
//! transport decides how the request actually travels.

use std::fmt;

use axum::body::Bytes;
use axum::http::{header, Method, Request, StatusCode};
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::dispatch::worker::WorkerHandler;
use crate::function::InvokeError;

/// One outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

/// The raw answer to an outbound call.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Carries a [`TransportRequest`] to wherever the container is served.
pub trait Transport: Send + Sync {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse, InvokeError>>;
}

/// Outbound HTTP via `reqwest`.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReqwestTransport")
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse, InvokeError>> {
        let client = self.client.clone();
        async move {
            let mut builder = client
                .request(request.method.clone(), &request.url)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let transport_err = |e: reqwest::Error| InvokeError::Transport {
                url: request.url.clone(),
                message: e.to_string(),
            };
            let response = builder.send().await.map_err(transport_err)?;
            let status = response.status();
            let body = response.bytes().await.map_err(transport_err)?;
            Ok(TransportResponse { status, body })
        }
        .boxed()
    }
}

/// Calls another container's fetch handler directly, without a socket.
///
/// This is the service-binding style transport: the target container is
/// hosted by the same runtime and reached through its worker adapter.
#[derive(Debug, Clone)]
pub struct ServiceTransport {
    target: WorkerHandler,
}

impl ServiceTransport {
    pub fn new(target: WorkerHandler) -> Self {
        Self { target }
    }
}

impl Transport for ServiceTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse, InvokeError>> {
        let target = self.target.clone();
        async move {
            let body = match &request.body {
                Some(v) => Bytes::from(serde_json::to_vec(v)?),
                None => Bytes::new(),
            };
            let http_request = Request::builder()
                .method(request.method.clone())
                .uri(&request.url)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .map_err(|e| InvokeError::Transport {
                    url: request.url.clone(),
                    message: e.to_string(),
                })?;

            let response = target.fetch(http_request).await;
            Ok(TransportResponse {
                status: response.status(),
                body: response.into_body(),
            })
        }
        .boxed()
    }
}
