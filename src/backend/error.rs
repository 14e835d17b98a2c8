//! Error types for backend drivers
//!
//! These are the errors a single connection attempt can produce. The
//! lifecycle manager treats all of them as transient.

use std::io;

use thiserror::Error;

/// Result type alias for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[derive(Error, Debug)]
pub enum BackendError {
    /// Address could not be turned into `host:port`
    #[error("Invalid backend URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Transport connection could not be established
    #[error("Connection to {endpoint} failed: {source}")]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// Sub-resource selection was rejected
    #[error("Invalid resource name {name:?}: {reason}")]
    InvalidResource { name: String, reason: String },

    /// I/O error on an established transport
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BackendError {
    /// Check if this error came from the network rather than from input
    pub fn is_network_error(&self) -> bool {
        matches!(self, BackendError::ConnectionFailed { .. } | BackendError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_classification() {
        let refused = BackendError::ConnectionFailed {
            endpoint: "127.0.0.1:1".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(refused.is_network_error());
        assert!(refused.to_string().contains("127.0.0.1:1"));

        let bad = BackendError::InvalidUri {
            uri: "mongodb://".to_string(),
            reason: "missing host".to_string(),
        };
        assert!(!bad.is_network_error());
    }
}
