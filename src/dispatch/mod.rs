//! Dispatch adapters.
//!
//! # Data Flow
//! ```text
//! host request (in-process | axum | worker fetch)
//!     → IncomingRequest { method, path, body }
//!     → dispatcher.rs
//!         Unmatched → Matched  (registration order, method + matcher)
//!         Matched   → Invoked  (decoded path args [+ JSON body])
//!         Invoked   → Responded 200 | Failed 500
//!         no match  → 404
//!     → OutgoingResponse { status, body }
//!     → host response (application/json)
//! ```
//!
//! The in-process host is [`Dispatcher::dispatch`] itself; the HTTP server
//! host lives in [`crate::http::server`].

pub mod dispatcher;
pub mod request;
pub mod worker;

pub use dispatcher::{extract_args, Dispatcher, RouteMatch};
pub use request::{IncomingRequest, OutgoingResponse};
pub use worker::WorkerHandler;
