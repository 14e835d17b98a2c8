/*!
 * Error types for Tether
 */

use std::io;
use std::path::PathBuf;

use tether_core_resilience::{DefaultsError, LifecycleError};
use thiserror::Error;

use crate::backend::BackendError;

pub type Result<T> = std::result::Result<T, TetherError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Error, Debug)]
pub enum TetherError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML for this service
    #[error("Invalid config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Process-wide retry defaults could not be resolved
    #[error(transparent)]
    RetryDefaults(#[from] DefaultsError),

    /// Backend connection lifecycle failed
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Cache endpoint could not be reached or closed
    #[error("Cache connection error: {0}")]
    Cache(#[source] BackendError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TetherError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // Fatal errors: nothing was started
            TetherError::Config(_)
            | TetherError::ConfigFile { .. }
            | TetherError::ConfigParse { .. }
            | TetherError::RetryDefaults(_) => EXIT_FATAL,
            TetherError::Lifecycle(LifecycleError::ConnectionNotEstablished { .. }) => EXIT_FATAL,
            // A close that never succeeded leaves the backend session dangling
            TetherError::Lifecycle(_) => EXIT_PARTIAL,
            TetherError::Cache(_) | TetherError::Io(_) => EXIT_PARTIAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(TetherError::Config("bad".into()).exit_code(), EXIT_FATAL);

        let not_established = TetherError::from(LifecycleError::ConnectionNotEstablished {
            attempts: 3,
            last: "refused".into(),
        });
        assert_eq!(not_established.exit_code(), EXIT_FATAL);

        let close = TetherError::from(LifecycleError::ConnectionClose {
            attempts: 3,
            last: "reset".into(),
        });
        assert_eq!(close.exit_code(), EXIT_PARTIAL);

        let io = TetherError::from(io::Error::new(io::ErrorKind::Other, "x"));
        assert_eq!(io.exit_code(), EXIT_PARTIAL);
    }

    #[test]
    fn test_lifecycle_message_is_transparent() {
        let err = TetherError::from(LifecycleError::ConnectionNotEstablished {
            attempts: 1,
            last: "refused".into(),
        });
        assert_eq!(err.to_string(), "Not possible to connect to the backend driver");
    }
}
