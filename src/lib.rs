//! Declare path-addressable functions once; run them in-process, behind a
//! local HTTP server, or across the network without changing callers.

pub mod architecture;
pub mod binding;
pub mod config;
pub mod demo;
pub mod dispatch;
pub mod function;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;

pub use architecture::Architecture;
pub use binding::{ArchitectureBinding, Overloads, ServiceEndpoint};
pub use config::ServerConfig;
pub use dispatch::{Dispatcher, IncomingRequest, OutgoingResponse, WorkerHandler};
pub use function::{handler, Function, InvokeError};
pub use http::ApiServer;
pub use lifecycle::Shutdown;
pub use routing::{ApiContainer, RoutePattern};
