//! End-to-end dispatch scenarios through the in-process, HTTP and worker hosts.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use arch_dispatch::binding::{ArchitectureBinding, Overloads, ServiceEndpoint};
use arch_dispatch::config::ServerConfig;
use arch_dispatch::demo::{greeted_names, HelloWorld};
use arch_dispatch::dispatch::{Dispatcher, IncomingRequest, WorkerHandler};
use arch_dispatch::function::{handler, Function, InvokeError};
use arch_dispatch::http::{ApiServer, X_REQUEST_ID};
use arch_dispatch::routing::ApiContainer;
use arch_dispatch::store::{KvBackend, MemoryBackend};

fn hello_world_with_memory_store() -> HelloWorld {
    let app = HelloWorld::new().unwrap();
    ArchitectureBinding::new()
        .bind(
            app.json_store.container(),
            ServiceEndpoint::new("localhost", 3001),
            MemoryBackend::new().overloads(),
        )
        .unwrap();
    app
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_hello_then_hellos_in_process() {
    let app = hello_world_with_memory_store();
    let dispatcher = Dispatcher::new(app.api.clone());

    let res = dispatcher.dispatch(IncomingRequest::get("/v1/api/hello/Ada")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!("Hello, Ada!"));

    let res = dispatcher.dispatch(IncomingRequest::get("/v1/api/hellos")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(greeted_names(&res.body), vec!["Ada"]);
}

#[tokio::test]
async fn test_hello_then_hellos_over_axum() {
    let app = hello_world_with_memory_store();
    let server = ApiServer::new(app.api.clone(), &ArchitectureBinding::new(), &ServerConfig::default());

    let res = server
        .router()
        .oneshot(Request::get("/v1/api/hello/Ada").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(X_REQUEST_ID));
    assert_eq!(body_json(res).await, json!("Hello, Ada!"));

    let res = server
        .router()
        .oneshot(Request::get("/v1/api/hellos").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(greeted_names(&body_json(res).await), vec!["Ada"]);
}

#[tokio::test]
async fn test_unregistered_method_is_404_everywhere() {
    let app = hello_world_with_memory_store();

    let res = Dispatcher::new(app.api.clone())
        .dispatch(IncomingRequest::new(Method::DELETE, "/v1/api/hello/Ada"))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, json!({"error": "Not found"}));

    let server = ApiServer::new(app.api.clone(), &ArchitectureBinding::new(), &ServerConfig::default());
    let res = server
        .router()
        .oneshot(Request::delete("/v1/api/hello/Ada").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await, json!({"error": "Not found"}));

    let res = WorkerHandler::new(app.api.clone())
        .fetch(Request::delete("https://api.example/v1/api/hello/Ada").body(Bytes::new()).unwrap())
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_then_get_over_worker_with_kv() {
    let mut c = ApiContainer::new("greeted-store");
    c.add_route("store", "POST /store/{collection}", Arc::new(Function::placeholder("store-handler")))
        .unwrap();
    c.add_route("get", "GET /get/{collection}", Arc::new(Function::placeholder("get-handler")))
        .unwrap();
    let c = Arc::new(c);
    ArchitectureBinding::new()
        .bind(&c, ServiceEndpoint::new("jsonstore", 0), KvBackend::default().overloads())
        .unwrap();
    assert!(c.validate_overloads().is_empty());

    let worker = WorkerHandler::new(c);
    let res = worker
        .fetch(
            Request::post("https://jsonstore.example/store/greeted")
                .body(Bytes::from_static(br#"{"k":1}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(res.body()).unwrap(), json!({"success": true}));

    let res = worker
        .fetch(Request::get("https://jsonstore.example/get/greeted").body(Bytes::new()).unwrap())
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(res.body()).unwrap(), json!([{"k": 1}]));
}

#[tokio::test]
async fn test_failing_handler_is_isolated() {
    let mut c = ApiContainer::new("api");
    c.add_route(
        "boom",
        "GET /boom",
        Arc::new(Function::new("boom", handler(|_| async { Err(InvokeError::handler("boom")) }))),
    )
    .unwrap();
    c.add_route("ok", "GET /ok", Arc::new(Function::new("ok", handler(|_| async { Ok(json!("fine")) }))))
        .unwrap();
    let server = ApiServer::new(Arc::new(c), &ArchitectureBinding::new(), &ServerConfig::default());

    let res = server
        .router()
        .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await, json!({"error": "boom"}));

    let res = server
        .router()
        .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!("fine"));
}

#[tokio::test]
async fn test_unbound_placeholder_reports_not_implemented() {
    let app = HelloWorld::new().unwrap();
    let res = Dispatcher::new(app.api.clone())
        .dispatch(IncomingRequest::get("/v1/api/hello/Ada"))
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.error_message(),
        Some("Function 'store-handler' is not implemented. Provide an overload before invoking.")
    );
}

#[tokio::test]
async fn test_server_marks_container_local() {
    let app = HelloWorld::new().unwrap();
    let binding = ArchitectureBinding::new();
    binding.bind(&app.api, ServiceEndpoint::new("hello-api", 3000), Overloads::new()).unwrap();
    assert!(binding.is_remote(&app.api));

    let _server = ApiServer::new(app.api.clone(), &binding, &ServerConfig::default());
    assert!(binding.is_local(&app.api));
    assert!(!binding.is_remote(&app.api));
}
