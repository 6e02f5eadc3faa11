//! The callable unit.
//!
//! # Responsibilities
//! - Hold a default implementation
//! - Hold at most one overload, replaced atomically
//! - Resolve every invocation to "overload if present, else default"
//!
//! # Design Decisions
//! - The overload slot is an `ArcSwapOption`: writers replace the whole slot,
//!   readers never observe a half-installed handler
//! - Invocations already in flight keep the handler they loaded
//! - Errors from either implementation are returned untouched
//! - A function belongs to at most one container; the first to register it
//!   claims it

use std::fmt;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwapOption;
use serde_json::Value;

use crate::function::handler::{Args, Handler, HandlerFuture, InvocationContext};
use crate::function::types::{InvokeError, InvokeResult};

/// Whether a function ships a real default or must be overloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Concrete,
    Placeholder,
}

/// A named operation with a default implementation and a swappable overload.
pub struct Function {
    id: String,
    kind: FunctionKind,
    default: Handler,
    resolved: ArcSwapOption<Handler>,
    owner: OnceLock<String>,
}

impl Function {
    /// Create a function backed by `default`.
    pub fn new(id: impl Into<String>, default: Handler) -> Self {
        Self {
            id: id.into(),
            kind: FunctionKind::Concrete,
            default,
            resolved: ArcSwapOption::empty(),
            owner: OnceLock::new(),
        }
    }

    /// Create a placeholder whose default always fails with "not implemented".
    pub fn placeholder(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = id.clone();
        let default: Handler = Arc::new(move |_args: Args, _ctx: InvocationContext| -> HandlerFuture {
            let err = InvokeError::NotImplemented(name.clone());
            Box::pin(async move { Err(err) })
        });
        Self {
            id,
            kind: FunctionKind::Placeholder,
            default,
            resolved: ArcSwapOption::empty(),
            owner: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == FunctionKind::Placeholder
    }

    /// Id of the container this function is registered in, if any.
    pub fn owner(&self) -> Option<&str> {
        self.owner.get().map(String::as_str)
    }

    /// Claim this function for `container`. Fails with the current owner when
    /// another container already holds it.
    pub(crate) fn claim(&self, container: &str) -> Result<(), String> {
        let owner = self.owner.get_or_init(|| container.to_string());
        if owner == container {
            Ok(())
        } else {
            Err(owner.clone())
        }
    }

    /// Replace the resolved implementation. The most recent call wins.
    pub fn overload(&self, handler: Handler) {
        tracing::debug!(function = %self.id, "Installing overload");
        self.resolved.store(Some(Arc::new(handler)));
    }

    pub fn has_overload(&self) -> bool {
        self.resolved.load().is_some()
    }

    /// Invoke with an empty context.
    pub async fn invoke(&self, args: Args) -> InvokeResult {
        self.invoke_with_context(args, InvocationContext::default()).await
    }

    /// Invoke the overload if one is installed, otherwise the default.
    pub async fn invoke_with_context(&self, args: Args, ctx: InvocationContext) -> InvokeResult {
        // Load once so a concurrent overload cannot split this call.
        let future = match self.resolved.load_full() {
            Some(overload) => (*overload)(args, ctx),
            None => (self.default)(args, ctx),
        };
        future.await
    }

    /// Invoke and deserialize the result into `T`.
    pub async fn invoke_as<T: serde::de::DeserializeOwned>(&self, args: Args) -> InvokeResult<T> {
        let value: Value = self.invoke(args).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("overloaded", &self.has_overload())
            .field("owner", &self.owner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::handler::handler;
    use serde_json::json;

    fn greeter() -> Function {
        Function::new(
            "hello-handler",
            handler(|args| async move {
                let name = args.first().and_then(Value::as_str).unwrap_or("nobody").to_string();
                Ok(json!(format!("Hello, {}!", name)))
            }),
        )
    }

    #[tokio::test]
    async fn test_default_is_idempotent() {
        let f = greeter();
        for _ in 0..3 {
            assert_eq!(f.invoke(vec![json!("Ada")]).await, Ok(json!("Hello, Ada!")));
        }
        assert!(!f.has_overload());
    }

    #[tokio::test]
    async fn test_overload_takes_priority() {
        let f = greeter();
        f.overload(handler(|_| async { Ok(json!("overloaded")) }));
        assert!(f.has_overload());
        assert_eq!(f.invoke(vec![json!("Ada")]).await, Ok(json!("overloaded")));
    }

    #[tokio::test]
    async fn test_last_overload_wins() {
        let f = greeter();
        f.overload(handler(|_| async { Ok(json!(1)) }));
        f.overload(handler(|_| async { Ok(json!(2)) }));
        assert_eq!(f.invoke(vec![]).await, Ok(json!(2)));
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let f = Function::new("boom", handler(|_| async { Err(InvokeError::handler("boom")) }));
        assert_eq!(f.invoke(vec![]).await, Err(InvokeError::handler("boom")));
    }

    #[tokio::test]
    async fn test_placeholder_fails_until_overloaded() {
        let f = Function::placeholder("get-handler");
        assert!(f.is_placeholder());
        let err = f.invoke(vec![]).await.unwrap_err();
        assert_eq!(err, InvokeError::NotImplemented("get-handler".into()));
        assert!(err.to_string().contains("'get-handler' is not implemented"));

        f.overload(handler(|_| async { Ok(json!([])) }));
        assert_eq!(f.invoke(vec![]).await, Ok(json!([])));
    }

    #[tokio::test]
    async fn test_invoke_as_decodes() {
        let f = Function::new("n", handler(|_| async { Ok(json!([1, 2, 3])) }));
        let v: Vec<u32> = f.invoke_as(vec![]).await.unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }
}
