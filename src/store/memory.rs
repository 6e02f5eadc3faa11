//! In-memory document backend.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{json, Value};

use crate::binding::Overloads;
use crate::function::{handler, string_arg, InvokeError};
use crate::store::json_store::{GET_ROUTE, STORE_ROUTE};

/// Per-collection vectors kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    collections: Arc<DashMap<String, Vec<Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, collection: &str, document: Value) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    pub fn get(&self, collection: &str) -> Vec<Value> {
        self.collections
            .get(collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default()
    }

    /// Overloads for a [`JsonStore`](crate::store::JsonStore) container.
    pub fn overloads(&self) -> Overloads {
        let store = self.clone();
        let get = self.clone();
        Overloads::new()
            .with(
                STORE_ROUTE,
                handler(move |args| {
                    let backend = store.clone();
                    async move {
                        let collection = string_arg(&args, 0)
                            .ok_or_else(|| InvokeError::handler("missing collection argument"))?;
                        let document = args.get(1).cloned().unwrap_or(Value::Null);
                        backend.store(&collection, document);
                        Ok(json!({ "success": true }))
                    }
                }),
            )
            .with(
                GET_ROUTE,
                handler(move |args| {
                    let backend = get.clone();
                    async move {
                        let collection = string_arg(&args, 0)
                            .ok_or_else(|| InvokeError::handler("missing collection argument"))?;
                        Ok(Value::Array(backend.get(&collection)))
                    }
                }),
            )
    }
}
