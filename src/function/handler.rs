//! Handler signatures shared by defaults and overloads.
//!
//! A handler takes the positional argument list (path parameters first, then
//! an optional JSON body) plus the invocation context, and resolves to a JSON
//! value. Defaults and overloads share this one signature so they can be
//! swapped freely.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::function::types::InvokeResult;

/// Positional arguments passed to a handler.
pub type Args = Vec<Value>;

/// Boxed future returned by every handler.
pub type HandlerFuture = BoxFuture<'static, InvokeResult>;

/// A type-erased, shareable handler.
pub type Handler = Arc<dyn Fn(Args, InvocationContext) -> HandlerFuture + Send + Sync>;

/// Per-invocation information supplied by the dispatch adapter.
///
/// In-process calls get the default (empty) context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    /// URL of the inbound request that triggered this invocation, if any.
    pub request_url: Option<String>,
}

impl InvocationContext {
    pub fn for_request(url: impl Into<String>) -> Self {
        Self {
            request_url: Some(url.into()),
        }
    }
}

/// Wrap an async closure over the argument list into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InvokeResult> + Send + 'static,
{
    Arc::new(move |args: Args, _ctx: InvocationContext| -> HandlerFuture { f(args).boxed() })
}

/// Like [`handler`], but the closure also receives the invocation context.
pub fn handler_with_context<F, Fut>(f: F) -> Handler
where
    F: Fn(Args, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InvokeResult> + Send + 'static,
{
    Arc::new(move |args: Args, ctx: InvocationContext| -> HandlerFuture { f(args, ctx).boxed() })
}

/// Fetch a string argument by position, accepting any JSON scalar.
pub fn string_arg(args: &[Value], index: usize) -> Option<String> {
    match args.get(index)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
