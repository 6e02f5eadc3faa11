//! The hello-world architecture.
//!
//! An `api` container greets callers and records each greeting in a JSON
//! store; the store's implementation is chosen at bind time (in memory, KV,
//! or another process).

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::architecture::{Architecture, ComponentKind};
use crate::function::{handler, string_arg, Function, InvokeError};
use crate::routing::{ApiContainer, RouteResult};
use crate::store::JsonStore;

/// Collection holding greetings.
pub const GREETED: &str = "greeted";

/// One recorded greeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    /// Milliseconds since the Unix epoch.
    pub when: u64,
    pub name: String,
}

/// The assembled hello-world architecture.
#[derive(Debug, Clone)]
pub struct HelloWorld {
    pub architecture: Architecture,
    pub api: Arc<ApiContainer>,
    pub json_store: JsonStore,
}

impl HelloWorld {
    pub fn new() -> RouteResult<Self> {
        let mut architecture = Architecture::new("hello-world");
        let json_store = JsonStore::new("greeted-store")?;
        architecture.add(json_store.id(), ComponentKind::JsonStore);

        let store = json_store.clone();
        let hello = Arc::new(Function::new(
            "hello-handler",
            handler(move |args| {
                let store = store.clone();
                async move {
                    let name = string_arg(&args, 0).ok_or_else(|| InvokeError::handler("missing name argument"))?;
                    let greeting = Greeting {
                        when: now_millis(),
                        name: name.clone(),
                    };
                    store.store(GREETED, &greeting).await?;
                    tracing::trace!(name = %name, "Greeting stored");
                    Ok(json!(format!("Hello, {}!", name)))
                }
            }),
        ));
        architecture.add(hello.id(), ComponentKind::Function);

        let store = json_store.clone();
        let hellos = Arc::new(Function::new(
            "hellos-handler",
            handler(move |_args| {
                let store = store.clone();
                async move { store.get_raw(GREETED).await }
            }),
        ));
        architecture.add(hellos.id(), ComponentKind::Function);

        let api = ApiContainer::with_routes(
            "api",
            vec![
                ("hello", "GET /v1/api/hello/{name}", hello),
                ("hellos", "GET /v1/api/hellos", hellos),
            ],
        )?;
        architecture.add(api.id(), ComponentKind::ApiContainer);

        Ok(Self {
            architecture,
            api: Arc::new(api),
            json_store,
        })
    }

    /// Look a container up by id.
    pub fn container(&self, id: &str) -> Option<&Arc<ApiContainer>> {
        [&self.api, self.json_store.container()]
            .into_iter()
            .find(|c| c.id() == id)
    }

    pub fn containers(&self) -> Vec<&Arc<ApiContainer>> {
        vec![self.json_store.container(), &self.api]
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Names of the greetings in a `hellos` answer.
pub fn greeted_names(hellos: &Value) -> Vec<String> {
    hellos
        .as_array()
        .map(|docs| {
            docs.iter()
                .filter_map(|d| d.get("name").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{ArchitectureBinding, ServiceEndpoint};
    use crate::store::MemoryBackend;

    #[tokio::test]
    async fn test_in_process_hello_and_hellos() {
        let app = HelloWorld::new().unwrap();
        let binding = ArchitectureBinding::new();
        binding
            .bind(
                app.json_store.container(),
                ServiceEndpoint::new("localhost", 3001),
                MemoryBackend::new().overloads(),
            )
            .unwrap();

        let hello = &app.api.get_route("hello").unwrap().handler;
        assert_eq!(hello.invoke(vec![json!("Ada")]).await, Ok(json!("Hello, Ada!")));

        let hellos = &app.api.get_route("hellos").unwrap().handler;
        let out = hellos.invoke(vec![]).await.unwrap();
        assert_eq!(greeted_names(&out), vec!["Ada"]);

        let typed: Vec<Greeting> = app.json_store.get(GREETED).await.unwrap();
        assert_eq!(typed.len(), 1);
        assert!(typed[0].when > 0);
    }

    #[test]
    fn test_containers_and_synth() {
        let app = HelloWorld::new().unwrap();
        assert!(app.container("api").is_some());
        assert!(app.container("greeted-store").is_some());
        assert!(app.container("nope").is_none());

        let def = app.architecture.synth();
        let ids: Vec<&str> = def.components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["greeted-store", "hello-handler", "hellos-handler", "api"]);
    }

    #[tokio::test]
    async fn test_hello_ignores_store_answer_shape() {
        let app = HelloWorld::new().unwrap();
        let overloads = crate::binding::Overloads::new()
            .with(crate::store::STORE_ROUTE, crate::function::handler(|_| async { Ok(json!(true)) }));
        ArchitectureBinding::new()
            .bind(app.json_store.container(), ServiceEndpoint::new("localhost", 3001), overloads)
            .unwrap();

        let hello = &app.api.get_route("hello").unwrap().handler;
        assert_eq!(hello.invoke(vec![json!("Ada")]).await, Ok(json!("Hello, Ada!")));
    }
}
