/*!
 * Tether - backend service bootstrap with a resilient connection lifecycle
 *
 * - One shared backend connection, owned by a lifecycle manager
 * - Immediate retries bounded by per-operation budgets
 * - Budgets defaulted from MONGO_CONNECT_RETRY / MONGO_DISCONNECT_RETRY, snapshotted once
 * - Socket-level backend driver and a single-shot cache connection
 * - TOML + environment configuration, structured logging
 */

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;

// Re-export commonly used types
pub use backend::{CacheConnection, Namespace, TcpClient, TcpFactory};
pub use config::{CacheConfig, LogLevel, ServiceConfig};
pub use error::{Result, TetherError};
pub use service::{BackendManager, Service};
pub use tether_core_resilience as resilience;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
