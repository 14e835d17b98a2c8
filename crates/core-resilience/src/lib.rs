//! Tether Core Resilience: pure-logic connection lifecycle primitives
//!
//! # Overview
//!
//! This crate provides the resilience layer that sits between an application
//! and a network-attached stateful backend (a database-like server). It
//! includes:
//!
//! - **Retry Budget**: decrement-only counters bounding connect and disconnect attempts
//! - **Connection Factory**: the single-attempt contract a backend driver adapter implements
//! - **Lifecycle Manager**: owns the one shared connection and drives the factory under the budgets
//!
//! # Key Principles
//!
//! This crate has zero knowledge of:
//! - Concrete drivers or wire protocols
//! - How defaults are configured beyond a snapshot value
//! - Application-specific concerns
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Your Application                │
//! └─────────────┬───────────────────────────┘
//!               │ connect / disconnect / session()
//!               ▼
//! ┌─────────────────────────────────────────┐
//! │       Lifecycle Manager                 │  ← Idle → Connected → Disconnected
//! │  (Owns handle, retries immediately)     │
//! └─────────────┬───────────────────────────┘
//!               │ one attempt at a time
//!               ▼
//! ┌─────────────────────────────────────────┐
//! │       Connection Factory                │  ← construct, connect, select
//! └─────────────┬───────────────────────────┘
//!               │
//!               ▼
//!         Backend Server
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use tether_core_resilience::{
//!     BoxError, ClientHandle, Connected, ConnectionFactory, ConnectionTarget,
//!     LifecycleError, LifecycleManager, RetryDefaults, RetryOverrides,
//! };
//!
//! struct MyClient;
//!
//! #[async_trait::async_trait]
//! impl ClientHandle for MyClient {
//!     async fn close(&self) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! struct MyFactory;
//!
//! #[async_trait::async_trait]
//! impl ConnectionFactory for MyFactory {
//!     type Client = MyClient;
//!     type Session = ();
//!
//!     async fn connect(&self, _target: &ConnectionTarget) -> Result<Connected<MyClient, ()>, BoxError> {
//!         Ok(Connected { client: MyClient, session: () })
//!     }
//! }
//!
//! # async fn example() -> Result<(), LifecycleError> {
//! let defaults = RetryDefaults::from_env().expect("valid retry defaults");
//! let mut manager = LifecycleManager::new(MyFactory, Some(RetryOverrides::new(2, 2)), &defaults);
//!
//! manager.connect("mongodb://127.0.0.1:27017", "app").await?;
//! manager.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod retry;

// Re-export main types for convenience
pub use error::{BoxError, LifecycleError};
pub use factory::{ClientHandle, Connected, ConnectionFactory, ConnectionTarget};
pub use lifecycle::{LifecycleManager, LifecycleState};
pub use retry::{
    should_retry, DefaultsError, RetryBudget, RetryDefaults, RetryOverrides, CONNECT_RETRY_ENV,
    DISCONNECT_RETRY_ENV,
};

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use tether_core_resilience::prelude::*;
/// ```
pub mod prelude {
    pub use super::error::{BoxError, LifecycleError};
    pub use super::factory::{ClientHandle, Connected, ConnectionFactory, ConnectionTarget};
    pub use super::lifecycle::{LifecycleManager, LifecycleState};
    pub use super::retry::{RetryBudget, RetryDefaults, RetryOverrides};
}
