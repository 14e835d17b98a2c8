//! Integration tests for the TCP backend driver and service bootstrap
//!
//! Each test binds its own listener on 127.0.0.1 and accepts connections in
//! the background, so no external backend is required.

use std::net::SocketAddr;

use tether::backend::{Namespace, TcpFactory};
use tether::config::{CacheConfig, ServiceConfig};
use tether::resilience::{
    LifecycleError, LifecycleManager, LifecycleState, RetryDefaults, RetryOverrides,
};
use tether::{Service, TetherError};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Listener that accepts and holds every connection until aborted
async fn spawn_backend() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    (addr, handle)
}

/// A port nothing listens on
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_tcp_factory_connect_and_disconnect() {
    let (addr, backend) = spawn_backend().await;

    let mut manager = LifecycleManager::new(
        TcpFactory::new(),
        Some(RetryOverrides::new(2, 2)),
        &RetryDefaults::default(),
    );
    manager
        .connect(&format!("mongodb://{}", addr), "clean-node-api")
        .await
        .unwrap();

    assert_eq!(manager.state(), LifecycleState::Connected);
    assert_eq!(
        manager.session(),
        Some(&Namespace {
            name: "clean-node-api".to_string()
        })
    );
    let client = manager.connection().unwrap();
    assert!(client.is_open().await);
    assert_eq!(client.endpoint().port, addr.port());

    manager.disconnect().await.unwrap();
    assert_eq!(manager.state(), LifecycleState::Disconnected);
    assert_eq!(manager.connect_retries(), 2);
    assert_eq!(manager.disconnect_retries(), 2);

    backend.abort();
}

#[tokio::test]
async fn test_tcp_factory_refused_exhausts_budget() {
    let port = closed_port().await;

    let mut manager = LifecycleManager::new(
        TcpFactory::new(),
        Some(RetryOverrides::new(2, 0)),
        &RetryDefaults::default(),
    );
    let err = manager
        .connect(&format!("127.0.0.1:{}", port), "app")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::ConnectionNotEstablished { attempts: 3, .. }
    ));
    assert_eq!(manager.connect_retries(), 0);
    assert_eq!(manager.state(), LifecycleState::Idle);
    assert!(manager.connection().is_none());
}

#[tokio::test]
async fn test_invalid_target_is_retried_like_any_failure() {
    let mut manager = LifecycleManager::new(
        TcpFactory::new(),
        Some(RetryOverrides::new(1, 0)),
        &RetryDefaults::default(),
    );
    let err = manager.connect("mongodb://", "app").await.unwrap_err();

    assert_eq!(err.attempts(), Some(2));
    assert_eq!(manager.connect_retries(), 0);
}

#[tokio::test]
async fn test_service_start_stop_with_cache() {
    let (backend_addr, backend) = spawn_backend().await;
    let (cache_addr, cache) = spawn_backend().await;

    let config = ServiceConfig {
        backend_uri: format!("mongodb://{}/ignored?x=1", backend_addr),
        database: "users".to_string(),
        cache: Some(CacheConfig {
            host: "127.0.0.1".to_string(),
            port: cache_addr.port(),
        }),
        ..Default::default()
    };
    let mut service = Service::new(config, &RetryDefaults::new(1, 1));

    service.start().await.unwrap();
    assert!(service.manager().is_connected());
    assert_eq!(service.manager().session().unwrap().name, "users");
    assert!(service.cache().unwrap().client().is_open().await);

    service.stop().await.unwrap();
    assert_eq!(service.manager().state(), LifecycleState::Disconnected);
    assert!(service.cache().is_none());

    backend.abort();
    cache.abort();
}

#[tokio::test]
async fn test_service_start_fails_when_backend_down() {
    let port = closed_port().await;
    let config = ServiceConfig {
        backend_uri: format!("127.0.0.1:{}", port),
        connect_retry: Some(1),
        ..Default::default()
    };
    let mut service = Service::new(config, &RetryDefaults::new(5, 5));

    let err = service.start().await.unwrap_err();
    assert!(matches!(
        err,
        TetherError::Lifecycle(LifecycleError::ConnectionNotEstablished { attempts: 2, .. })
    ));
    assert_eq!(err.exit_code(), tether::error::EXIT_FATAL);
    assert_eq!(service.manager().connect_retries(), 0);
    // Disconnect budget still comes from the defaults
    assert_eq!(service.manager().disconnect_retries(), 5);

    let err = service.stop().await.unwrap_err();
    assert!(matches!(
        err,
        TetherError::Lifecycle(LifecycleError::NotConnected)
    ));
}

#[tokio::test]
async fn test_service_start_closes_backend_when_cache_down() {
    let (backend_addr, backend) = spawn_backend().await;
    let cache_port = closed_port().await;

    let config = ServiceConfig {
        backend_uri: backend_addr.to_string(),
        cache: Some(CacheConfig {
            host: "127.0.0.1".to_string(),
            port: cache_port,
        }),
        ..Default::default()
    };
    let mut service = Service::new(config, &RetryDefaults::new(0, 1));

    let err = service.start().await.unwrap_err();
    assert!(matches!(err, TetherError::Cache(_)));
    assert_eq!(service.manager().state(), LifecycleState::Disconnected);
    assert!(service.manager().connection().is_none());
    assert_eq!(service.manager().disconnect_retries(), 1);
    assert!(service.cache().is_none());

    backend.abort();
}

#[tokio::test]
async fn test_run_until_shutdown() {
    let (addr, backend) = spawn_backend().await;
    let config = ServiceConfig {
        backend_uri: addr.to_string(),
        ..Default::default()
    };

    tether::service::run(config, &RetryDefaults::default(), async {})
        .await
        .unwrap();

    backend.abort();
}
