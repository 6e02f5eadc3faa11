//! Binding subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap (before traffic):
//!     ArchitectureBinding::new()
//!     → bind(container, endpoint, overloads)        explicit overloads
//!     → bind_from_env(container, PREFIX, ...)       <PREFIX>_HOST / _PORT
//!     → bind_remote(container, endpoint, transport) every route forwarded
//!     → mark_local(container)                       served by this process
//!
//! Remote overload, per call:
//!     args → remote.rs (URL + body) → transport.rs (reqwest | service) → JSON
//! ```

pub mod registry;
pub mod remote;
pub mod transport;
pub mod types;

pub use registry::{remote_overloads, ArchitectureBinding, Overloads, ServiceEndpoint};
pub use remote::http_handler;
pub use transport::{ReqwestTransport, ServiceTransport, Transport, TransportRequest, TransportResponse};
pub use types::{BindingError, BindingResult};
