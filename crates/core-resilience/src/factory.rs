//! Connection factory contract
//!
//! A factory performs exactly one connection attempt: construct the client,
//! establish its transport, select the named sub-resource. It never retries
//! and never swallows errors; retry decisions belong to the
//! [`LifecycleManager`](crate::LifecycleManager).

use crate::error::BoxError;

/// Where to connect, passed to the factory unmodified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Backend address, e.g. `mongodb://127.0.0.1:27017`
    pub uri: String,
    /// Logical sub-resource to select once connected (database, namespace)
    pub resource: String,
}

impl ConnectionTarget {
    pub fn new(uri: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            resource: resource.into(),
        }
    }
}

/// A live client that can be closed
///
/// `close` takes `&self` so a failed close can be retried against the same
/// handle.
#[async_trait::async_trait]
pub trait ClientHandle: Send + Sync + 'static {
    async fn close(&self) -> Result<(), BoxError>;
}

/// Output of one successful factory attempt
#[derive(Debug)]
pub struct Connected<C, S> {
    pub client: C,
    pub session: S,
}

/// Factory trait for establishing backend connections
///
/// # Example
/// ```no_run
/// use tether_core_resilience::{BoxError, ClientHandle, Connected, ConnectionFactory, ConnectionTarget};
///
/// struct MyClient;
///
/// #[async_trait::async_trait]
/// impl ClientHandle for MyClient {
///     async fn close(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// struct MyFactory;
///
/// #[async_trait::async_trait]
/// impl ConnectionFactory for MyFactory {
///     type Client = MyClient;
///     type Session = String;
///
///     async fn connect(
///         &self,
///         target: &ConnectionTarget,
///     ) -> Result<Connected<MyClient, String>, BoxError> {
///         Ok(Connected { client: MyClient, session: target.resource.clone() })
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait ConnectionFactory: Send + Sync {
    type Client: ClientHandle;
    type Session: Send + Sync + 'static;

    /// Make one connection attempt
    async fn connect(
        &self,
        target: &ConnectionTarget,
    ) -> Result<Connected<Self::Client, Self::Session>, BoxError>;
}
