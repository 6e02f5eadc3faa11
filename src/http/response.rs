//! Response rendering for the HTTP server.
//!
//! # Design Decisions
//! - Every response is `application/json`, errors included
//! - Body-read failures use the same `{"error": ...}` envelope as handlers

use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::dispatch::OutgoingResponse;

impl IntoResponse for OutgoingResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    #[tokio::test]
    async fn test_error_envelope_is_json() {
        let res = OutgoingResponse::not_found().into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"error":"Not found"}"#);
    }
}
