//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route definition (at startup):
//!     "POST /v1/api/store/{collection}"
//!     → pattern.rs (method, literal segments, param names, matcher)
//!     → table.rs (named entry in an ApiContainer)
//!
//! Incoming request:
//!     (method, path)
//!     → entries in registration order
//!     → first pattern whose method and matcher both accept
//!     → captures in param-name order
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once at registration, immutable afterwards
//! - Deterministic: same input always matches the same route
//! - First match wins (registration order)

pub mod pattern;
pub mod table;
pub mod types;

pub use pattern::RoutePattern;
pub use table::{ApiContainer, RouteEntry};
pub use types::{RouteError, RouteResult};
