//! A JSON document store exposed as a container.
//!
//! Both routes are placeholders: the store only defines the API contract.
//! A backend (or a remote binding) supplies the implementation through
//! overloads.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::function::{Function, InvokeResult};
use crate::routing::{ApiContainer, RouteResult};

/// Name of the store route.
pub const STORE_ROUTE: &str = "store";
/// Name of the get route.
pub const GET_ROUTE: &str = "get";

/// Container with `store` and `get` routes over named collections.
#[derive(Debug, Clone)]
pub struct JsonStore {
    container: Arc<ApiContainer>,
    store_fn: Arc<Function>,
    get_fn: Arc<Function>,
}

impl JsonStore {
    pub fn new(id: impl Into<String>) -> RouteResult<Self> {
        let store_fn = Arc::new(Function::placeholder("store-handler"));
        let get_fn = Arc::new(Function::placeholder("get-handler"));

        let mut container = ApiContainer::new(id);
        container.add_route(STORE_ROUTE, "POST /v1/api/store/{collection}", store_fn.clone())?;
        container.add_route(GET_ROUTE, "GET /v1/api/get/{collection}", get_fn.clone())?;

        Ok(Self {
            container: Arc::new(container),
            store_fn,
            get_fn,
        })
    }

    pub fn container(&self) -> &Arc<ApiContainer> {
        &self.container
    }

    pub fn id(&self) -> &str {
        self.container.id()
    }

    /// Append `document` to `collection`.
    ///
    /// Returns whatever the backend answered (`{"success": true}` for the
    /// bundled backends); its shape is not checked.
    pub async fn store<T: Serialize>(&self, collection: &str, document: &T) -> InvokeResult<Value> {
        let document = serde_json::to_value(document)?;
        self.store_fn.invoke(vec![json!(collection), document]).await
    }

    /// All documents of `collection` as raw JSON.
    pub async fn get_raw(&self, collection: &str) -> InvokeResult<Value> {
        self.get_fn.invoke(vec![json!(collection)]).await
    }

    /// All documents of `collection`, decoded into `T`.
    pub async fn get<T: DeserializeOwned>(&self, collection: &str) -> InvokeResult<Vec<T>> {
        let value = self.get_raw(collection).await?;
        Ok(serde_json::from_value(value)?)
    }
}
