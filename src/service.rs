/*!
 * Service bootstrap: owns the backend lifecycle and the optional cache
 */

use std::future::Future;

use tether_core_resilience::{LifecycleManager, RetryDefaults};
use tracing::{info, warn};

use crate::backend::{CacheConnection, TcpFactory};
use crate::config::ServiceConfig;
use crate::error::{Result, TetherError};

/// Lifecycle manager for the primary backend
pub type BackendManager = LifecycleManager<TcpFactory>;

/// The process-wide connection owner
///
/// Consumers borrow the backend session through [`Service::manager`]; only
/// `start` and `stop` change connection state.
pub struct Service {
    config: ServiceConfig,
    manager: BackendManager,
    cache: Option<CacheConnection>,
}

impl Service {
    /// Build the service; retry budgets are fixed here for its lifetime
    pub fn new(config: ServiceConfig, defaults: &RetryDefaults) -> Self {
        let manager =
            LifecycleManager::new(TcpFactory::new(), Some(config.retry_overrides()), defaults);
        Self {
            config,
            manager,
            cache: None,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn manager(&self) -> &BackendManager {
        &self.manager
    }

    pub fn cache(&self) -> Option<&CacheConnection> {
        self.cache.as_ref()
    }

    /// Connect the backend, then the cache if one is configured
    ///
    /// If the cache cannot be opened the backend is disconnected again before
    /// the cache error is returned.
    pub async fn start(&mut self) -> Result<()> {
        info!(uri = %self.config.backend_uri, database = %self.config.database, "Starting service");
        self.manager
            .connect(&self.config.backend_uri, &self.config.database)
            .await?;

        if let Some(cache) = &self.config.cache {
            match CacheConnection::open(&cache.host, cache.port).await {
                Ok(connection) => self.cache = Some(connection),
                Err(e) => {
                    warn!(error = %e, "Cache unavailable, closing backend connection");
                    if let Err(close_err) = self.manager.disconnect().await {
                        warn!(error = %close_err, "Failed to close backend after cache error");
                    }
                    return Err(TetherError::Cache(e));
                }
            }
        }
        Ok(())
    }

    /// Close the cache, then disconnect the backend
    ///
    /// The backend is disconnected even when closing the cache fails; the
    /// first error encountered is returned.
    pub async fn stop(&mut self) -> Result<()> {
        let mut first_error = None;

        if let Some(cache) = self.cache.take() {
            if let Err(e) = cache.disconnect().await {
                warn!(error = %e, "Failed to close cache connection");
                first_error = Some(TetherError::Cache(e));
            }
        }

        if let Err(e) = self.manager.disconnect().await {
            if first_error.is_none() {
                first_error = Some(TetherError::Lifecycle(e));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("Service stopped");
                Ok(())
            }
        }
    }
}

/// Start the service, wait for `shutdown`, then stop it
pub async fn run<S>(config: ServiceConfig, defaults: &RetryDefaults, shutdown: S) -> Result<()>
where
    S: Future<Output = ()>,
{
    let mut service = Service::new(config, defaults);
    service.start().await?;
    info!("Service ready");

    shutdown.await;
    info!("Shutdown requested");

    service.stop().await
}
