/*!
 * Configuration types for Tether
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tether_core_resilience::RetryOverrides;

use crate::error::{Result, TetherError};

pub const ENV_BACKEND_URI: &str = "TETHER_BACKEND_URI";
pub const ENV_DATABASE: &str = "TETHER_DATABASE";
pub const ENV_CACHE_HOST: &str = "TETHER_CACHE_HOST";
pub const ENV_CACHE_PORT: &str = "TETHER_CACHE_PORT";
pub const ENV_LOG_LEVEL: &str = "TETHER_LOG_LEVEL";

pub const DEFAULT_CACHE_PORT: u16 = 6379;

/// Service configuration
///
/// Resolution order: built-in defaults, then an optional TOML file, then
/// `TETHER_*` environment variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Backend address handed to the connection factory
    #[serde(default = "default_backend_uri")]
    pub backend_uri: String,

    /// Logical database selected after connecting
    #[serde(default = "default_database")]
    pub database: String,

    /// Explicit connect retry budget (None = use MONGO_CONNECT_RETRY)
    #[serde(default)]
    pub connect_retry: Option<u32>,

    /// Explicit disconnect retry budget (None = use MONGO_DISCONNECT_RETRY)
    #[serde(default)]
    pub disconnect_retry: Option<u32>,

    /// Optional cache endpoint opened alongside the backend
    #[serde(default)]
    pub cache: Option<CacheConfig>,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

fn default_backend_uri() -> String {
    "mongodb://127.0.0.1:27017".to_string()
}

fn default_database() -> String {
    "tether".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend_uri: default_backend_uri(),
            database: default_database(),
            connect_retry: None,
            disconnect_retry: None,
            cache: None,
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| TetherError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| TetherError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `TETHER_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_lookup(|var| std::env::var(var).ok())
    }

    /// Apply overrides through an arbitrary variable lookup
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup(ENV_BACKEND_URI) {
            self.backend_uri = uri;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database = database;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level.parse()?;
        }

        let port = match lookup(ENV_CACHE_PORT) {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
                TetherError::Config(format!("{} must be a port number, got {:?}", ENV_CACHE_PORT, raw))
            })?),
            None => None,
        };
        match (lookup(ENV_CACHE_HOST), port) {
            (Some(host), port) => {
                self.cache = Some(CacheConfig {
                    host,
                    port: port.unwrap_or(DEFAULT_CACHE_PORT),
                });
            }
            (None, Some(port)) => match self.cache.as_mut() {
                Some(cache) => cache.port = port,
                None => {
                    return Err(TetherError::Config(format!(
                        "{} is set but {} is not",
                        ENV_CACHE_PORT, ENV_CACHE_HOST
                    )))
                }
            },
            (None, None) => {}
        }

        Ok(())
    }

    /// Retry overrides for the lifecycle manager; unset fields fall back to defaults
    pub fn retry_overrides(&self) -> RetryOverrides {
        RetryOverrides {
            connect_retry: self.connect_retry,
            disconnect_retry: self.disconnect_retry,
        }
    }
}

/// Cache endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub host: String,
    #[serde(default = "default_cache_port")]
    pub port: u16,
}

fn default_cache_port() -> u16 {
    DEFAULT_CACHE_PORT
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = TetherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(TetherError::Config(format!("Unknown log level: {}", other))),
        }
    }
}
