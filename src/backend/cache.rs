//! Single-endpoint cache connection
//!
//! The degenerate form of the factory contract: construct, connect, hand back
//! the client. No retry budget and no sub-resource selection; a failed open
//! is reported to the caller as-is.

use tracing::info;

use super::error::BackendResult;
use super::tcp::{Endpoint, TcpClient};

#[derive(Debug)]
pub struct CacheConnection {
    client: TcpClient,
}

impl CacheConnection {
    /// Connect to `host:port` in a single attempt
    pub async fn open(host: &str, port: u16) -> BackendResult<Self> {
        let client = TcpClient::new(Endpoint {
            host: host.to_string(),
            port,
        });
        client.open().await?;
        info!(endpoint = %client.endpoint(), "Cache connection established");
        Ok(Self { client })
    }

    pub fn client(&self) -> &TcpClient {
        &self.client
    }

    pub async fn disconnect(&self) -> BackendResult<()> {
        self.client.shutdown().await?;
        info!(endpoint = %self.client.endpoint(), "Cache connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_and_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });

        let cache = CacheConnection::open("127.0.0.1", port).await.unwrap();
        assert!(cache.client().is_open().await);
        accept.await.unwrap().unwrap();

        cache.disconnect().await.unwrap();
        assert!(!cache.client().is_open().await);
    }

    #[tokio::test]
    async fn test_open_refused() {
        // Bind then drop to get a port with nothing listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = CacheConnection::open("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, BackendError::ConnectionFailed { .. }));
    }
}
