//! Key-value document backend.
//!
//! Documents live in a flat namespace under `<collection>:<uuid>` keys and
//! are read back with a prefix listing, the layout a worker KV binding uses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::binding::Overloads;
use crate::function::{handler, string_arg, InvokeError, InvokeResult};
use crate::store::json_store::{GET_ROUTE, STORE_ROUTE};

/// A flat string namespace that lists keys in write order.
#[derive(Debug, Default)]
pub struct KvNamespace {
    entries: DashMap<String, (u64, String)>,
    next_seq: AtomicU64,
}

impl KvNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(key.into(), (seq, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|e| e.value().1.clone())
    }

    /// Keys starting with `prefix`, oldest write first.
    pub fn list(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<(u64, String)> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| (e.value().0, e.key().clone()))
            .collect();
        keys.sort_unstable_by_key(|(seq, _)| *seq);
        keys.into_iter().map(|(_, k)| k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Document backend over a [`KvNamespace`].
#[derive(Debug, Clone, Default)]
pub struct KvBackend {
    kv: Arc<KvNamespace>,
}

impl KvBackend {
    pub fn new(kv: Arc<KvNamespace>) -> Self {
        Self { kv }
    }

    pub fn namespace(&self) -> &Arc<KvNamespace> {
        &self.kv
    }

    pub fn store(&self, collection: &str, document: &Value) -> InvokeResult<()> {
        let key = format!("{}:{}", collection, Uuid::new_v4());
        self.kv.put(key, serde_json::to_string(document)?);
        Ok(())
    }

    /// Documents of `collection`; values that fail to parse are skipped.
    pub fn get(&self, collection: &str) -> Vec<Value> {
        self.kv
            .list(&format!("{}:", collection))
            .iter()
            .filter_map(|key| self.kv.get(key))
            .filter_map(|raw| match serde_json::from_str::<Value>(&raw) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(collection = %collection, error = %e, "Skipping unreadable document");
                    None
                }
            })
            .collect()
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
                        tracing::debug!(collection = %collection, "KV store");
                        backend.store(&collection, &document)?;
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
