//! Socket-level backend driver
//!
//! A thin [`ConnectionFactory`] over `tokio::net::TcpStream`. One attempt
//! builds a [`TcpClient`] from the target URI, opens its socket and selects
//! the requested [`Namespace`]. Nothing here retries.

use std::fmt;

use tether_core_resilience::{BoxError, ClientHandle, Connected, ConnectionFactory, ConnectionTarget};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::{Host, Url};

use super::error::{BackendError, BackendResult};

/// Port used when the URI names none
pub const DEFAULT_PORT: u16 = 27017;

/// Host and port extracted from a backend URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Parse `scheme://[user@]host[:port][/path][?query]` or bare `host[:port]`
    ///
    /// Only the first host of a comma-separated seed list is used.
    pub fn parse(uri: &str, default_port: u16) -> BackendResult<Self> {
        let invalid = |reason: String| BackendError::InvalidUri {
            uri: uri.to_string(),
            reason,
        };

        let url = Url::parse(&first_seed(uri)).map_err(|e| invalid(e.to_string()))?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(invalid("missing host".to_string())),
        };
        let port = url.port_or_known_default().unwrap_or(default_port);

        Ok(Self { host, port })
    }
}

/// Normalise `uri` for [`Url::parse`]: add a scheme to bare addresses and
/// keep only the first host of a seed list
fn first_seed(uri: &str) -> String {
    let (scheme, rest) = uri.split_once("://").unwrap_or(("tcp", uri));

    let split = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(split);
    let (userinfo, hosts) = match authority.rsplit_once('@') {
        Some((userinfo, hosts)) => (Some(userinfo), hosts),
        None => (None, authority),
    };
    let host = hosts.split(',').next().unwrap_or_default();

    match userinfo {
        Some(userinfo) => format!("{scheme}://{userinfo}@{host}{tail}"),
        None => format!("{scheme}://{host}{tail}"),
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// The named logical unit selected on a connected client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
}

/// A socket-backed client
#[derive(Debug)]
pub struct TcpClient {
    endpoint: Endpoint,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpClient {
    /// Build a client for `endpoint` without touching the network
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            stream: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Establish the transport connection
    pub async fn open(&self) -> BackendResult<()> {
        let stream = TcpStream::connect((self.endpoint.host.as_str(), self.endpoint.port))
            .await
            .map_err(|source| BackendError::ConnectionFailed {
                endpoint: self.endpoint.to_string(),
                source,
            })?;
        stream.set_nodelay(true)?;

        *self.stream.lock().await = Some(stream);
        debug!(endpoint = %self.endpoint, "Socket open");
        Ok(())
    }

    /// Select a named namespace on this client
    pub fn select(&self, name: &str) -> BackendResult<Namespace> {
        if name.is_empty() {
            return Err(BackendError::InvalidResource {
                name: name.to_string(),
                reason: "name must not be empty".to_string(),
            });
        }
        if name.contains(|c: char| c == '/' || c == '\\' || c == '.' || c == ' ' || c == '\0') {
            return Err(BackendError::InvalidResource {
                name: name.to_string(),
                reason: "name contains a reserved character".to_string(),
            });
        }
        Ok(Namespace {
            name: name.to_string(),
        })
    }

    pub async fn is_open(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    /// Shut the socket down; closing an already closed client succeeds
    pub async fn shutdown(&self) -> BackendResult<()> {
        let mut guard = self.stream.lock().await;
        if let Some(stream) = guard.as_mut() {
            stream.shutdown().await?;
            trace!(endpoint = %self.endpoint, "Socket shut down");
        }
        *guard = None;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClientHandle for TcpClient {
    async fn close(&self) -> Result<(), BoxError> {
        self.shutdown().await.map_err(BoxError::from)
    }
}

/// Factory producing [`TcpClient`]s
#[derive(Debug, Clone)]
pub struct TcpFactory {
    default_port: u16,
}

impl TcpFactory {
    pub fn new() -> Self {
        Self::with_default_port(DEFAULT_PORT)
    }

    pub fn with_default_port(default_port: u16) -> Self {
        Self { default_port }
    }

    /// One attempt: construct, connect, select
    pub async fn attempt(
        &self,
        target: &ConnectionTarget,
    ) -> BackendResult<Connected<TcpClient, Namespace>> {
        let client = TcpClient::new(Endpoint::parse(&target.uri, self.default_port)?);
        client.open().await?;
        let session = client.select(&target.resource)?;
        Ok(Connected { client, session })
    }
}

impl Default for TcpFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConnectionFactory for TcpFactory {
    type Client = TcpClient;
    type Session = Namespace;

    async fn connect(
        &self,
        target: &ConnectionTarget,
    ) -> Result<Connected<TcpClient, Namespace>, BoxError> {
        self.attempt(target).await.map_err(BoxError::from)
    }
}
