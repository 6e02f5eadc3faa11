//! Callable units.
//!
//! # Data Flow
//! ```text
//! Function::new(id, default) / Function::placeholder(id)
//!     → [binding phase] overload(handler)   (zero or more times)
//!     → invoke(args)
//!         → overload present?  yes → overload(args)
//!                              no  → default(args)
//! ```

pub mod handler;
pub mod types;
pub mod unit;

pub use handler::{handler, handler_with_context, string_arg, Args, Handler, HandlerFuture, InvocationContext};
pub use types::{InvokeError, InvokeResult};
pub use unit::{Function, FunctionKind};
