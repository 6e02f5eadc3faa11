//! Host-neutral request and response.
//!
//! Every dispatch adapter maps its host's native request onto
//! [`IncomingRequest`] and renders [`OutgoingResponse`] back.

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

/// A request as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub path: String,
    pub body: Bytes,
    /// Full request URL, handed to handlers through the invocation context.
    pub url: Option<String>,
}

impl IncomingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Bytes::new(),
            url: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the body to the JSON encoding of `value`.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.with_body(bytes))
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A response ready to be rendered by a host.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl OutgoingResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "Not found")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// The `error` field, if this is an error envelope.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// Serialized JSON body.
    pub fn body_bytes(&self) -> Bytes {
        // Serializing a `Value` cannot fail.
        Bytes::from(serde_json::to_vec(&self.body).unwrap_or_default())
    }
}
