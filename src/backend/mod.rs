//! Backend drivers plugged into the connection lifecycle
//!
//! - **tcp**: socket-level [`ConnectionFactory`](tether_core_resilience::ConnectionFactory)
//!   for the primary database-like backend
//! - **cache**: single-attempt connection to a cache endpoint

pub mod cache;
pub mod error;
pub mod tcp;

pub use cache::CacheConnection;
pub use error::{BackendError, BackendResult};
pub use tcp::{Endpoint, Namespace, TcpClient, TcpFactory, DEFAULT_PORT};
