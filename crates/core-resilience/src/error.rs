//! Error types for connection lifecycle operations

use thiserror::Error;

/// A single failed attempt, as reported by a factory or a client's close call.
///
/// Attempt errors are never inspected by cause; any of them is retryable
/// while budget remains.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal errors surfaced by the [`LifecycleManager`](crate::LifecycleManager)
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Connect budget exhausted
    #[error("Not possible to connect to the backend driver")]
    ConnectionNotEstablished {
        /// Total attempts made by the failing `connect` call
        attempts: u32,
        /// Error returned by the final attempt
        #[source]
        last: BoxError,
    },

    /// Disconnect budget exhausted; the handle is still held
    #[error("Not possible to close the backend driver")]
    ConnectionClose {
        attempts: u32,
        #[source]
        last: BoxError,
    },

    /// `disconnect` was called while no connection is held
    #[error("No backend connection is held")]
    NotConnected,

    /// The manager already completed its disconnect and cannot be reused
    #[error("Connection lifecycle already terminated")]
    Terminated,
}

impl LifecycleError {
    /// Number of attempts made before this error was surfaced, if any were made
    pub fn attempts(&self) -> Option<u32> {
        match self {
            LifecycleError::ConnectionNotEstablished { attempts, .. }
            | LifecycleError::ConnectionClose { attempts, .. } => Some(*attempts),
            LifecycleError::NotConnected | LifecycleError::Terminated => None,
        }
    }

    /// True when the error came from exhausting a retry budget
    pub fn is_exhausted(&self) -> bool {
        self.attempts().is_some()
    }
}
