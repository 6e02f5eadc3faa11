//! HTTP server adapter.
//!
//! # Responsibilities
//! - Serve one container's routes over HTTP with Axum
//! - Wire up middleware (request ID, tracing) and the request timeout
//! - Hand every request to the shared dispatcher
//! - Shut down gracefully on signal
//!
//! # Design Decisions
//! - A single fallback handler receives every request; the dispatcher, not
//!   Axum's router, decides which route matches, so matching semantics are
//!   identical across hosts
//! - Constructing a server marks its container local in the registry
//! - The timeout wraps dispatch inside the handler so a timed-out request
//!   still answers with a JSON error envelope

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::binding::ArchitectureBinding;
use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, IncomingRequest, OutgoingResponse};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::tracing::request_span;
use crate::routing::ApiContainer;

/// State injected into the fallback handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

/// HTTP server for one container.
pub struct ApiServer {
    router: Router,
    container: Arc<ApiContainer>,
}

impl ApiServer {
    /// Create a server for `container` and mark it local in `binding`.
    pub fn new(container: Arc<ApiContainer>, binding: &ArchitectureBinding, config: &ServerConfig) -> Self {
        binding.mark_local(&container);

        let state = AppState {
            dispatcher: Dispatcher::new(container.clone()),
            max_body_bytes: config.listener.max_body_bytes,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        let router = Self::build_router(state);
        Self { router, container }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// The configured router, for serving or driving with `oneshot` in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn container(&self) -> &Arc<ApiContainer> {
        &self.container
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let unresolved = self.container.validate_overloads();
        if !unresolved.is_empty() {
            let ids: Vec<&str> = unresolved.iter().map(|f| f.id()).collect();
            tracing::warn!(container = %self.container.id(), functions = ?ids, "Serving with unimplemented functions");
        }

        tracing::info!(
            container = %self.container.id(),
            address = %addr,
            routes = ?self.container.list_routes(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(container = %self.container.id(), "HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: map the Axum request onto the dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Failed to read request body");
            return OutgoingResponse::internal_error(format!("Failed to read request body: {}", e)).into_response();
        }
    };

    let incoming = IncomingRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        body,
        url: Some(parts.uri.to_string()),
    };
    match tokio::time::timeout(state.request_timeout, state.dispatcher.dispatch(incoming)).await {
        Ok(response) => response.into_response(),
        Err(_) => {
            tracing::warn!(path = %parts.uri.path(), timeout = ?state.request_timeout, "Request timed out");
            OutgoingResponse::error(StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{handler, Function};
    use axum::http::header;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn server_with_timeout(secs: u64) -> ApiServer {
        let mut c = ApiContainer::new("api");
        c.add_route(
            "slow",
            "GET /slow",
            Arc::new(Function::new(
                "slow",
                handler(|_| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    Ok(json!("late"))
                }),
            )),
        )
        .unwrap();
        c.add_route("fast", "GET /fast", Arc::new(Function::new("fast", handler(|_| async { Ok(json!("ok")) }))))
            .unwrap();

        let mut config = ServerConfig::default();
        config.timeouts.request_secs = secs;
        ApiServer::new(Arc::new(c), &ArchitectureBinding::new(), &config)
    }

    #[tokio::test]
    async fn test_timeout_answers_with_json_envelope() {
        let server = server_with_timeout(1);
        let res = server
            .router()
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"error": "Request timed out"}));
    }

    #[tokio::test]
    async fn test_fast_route_unaffected_by_timeout() {
        let server = server_with_timeout(1);
        let res = server
            .router()
            .oneshot(Request::get("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
