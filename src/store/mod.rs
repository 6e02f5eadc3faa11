//! JSON document store.
//!
//! # Data Flow
//! ```text
//! JsonStore (placeholder store/get routes)
//!     ← bind(..., MemoryBackend::overloads())   in-process vectors
//!     ← bind(..., KvBackend::overloads())       <collection>:<uuid> keys
//!     ← bind_remote(..., endpoint, transport)   another process
//! ```

pub mod json_store;
pub mod kv;
pub mod memory;

pub use json_store::{JsonStore, GET_ROUTE, STORE_ROUTE};
pub use kv::{KvBackend, KvNamespace};
pub use memory::MemoryBackend;
