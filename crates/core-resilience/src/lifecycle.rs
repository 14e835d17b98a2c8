//! Connection lifecycle manager
//!
//! Owns the single shared backend connection for a process.
//!
//! ```text
//!                    ┌──────────────┐
//!       new() ─────> │     Idle     │ <─┐ connect() exhausted
//!                    └──────┬───────┘ ──┘
//!                           │ connect() ok
//!                    ┌──────▼───────┐ <─┐ connect() ok (handle replaced)
//!                    │  Connected   │ ──┤
//!                    └──────┬───────┘ <─┘ disconnect() exhausted (handle kept)
//!                           │ disconnect() ok
//!                    ┌──────▼───────┐
//!                    │ Disconnected │ ← terminal
//!                    └──────────────┘
//! ```
//!
//! `connect` and `disconnect` each run an immediate retry loop bounded by
//! their own [`RetryBudget`]. Budgets are consumed on failure and never
//! restored. Both operations take `&mut self`, so overlapping transitions on
//! one manager cannot be expressed.

use crate::error::LifecycleError;
use crate::factory::{ClientHandle, Connected, ConnectionFactory, ConnectionTarget};
use crate::retry::{DefaultsError, RetryBudget, RetryDefaults, RetryOverrides};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No handle held
    Idle,
    /// Client and session held
    Connected,
    /// Client closed; the instance cannot reconnect
    Disconnected,
}

impl LifecycleState {
    /// String representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Connected => "connected",
            LifecycleState::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal state; the handle lives only in `Connected`
#[derive(Debug)]
enum Slot<C, S> {
    Idle,
    Connected(Connected<C, S>),
    Disconnected,
}

/// Retrying owner of one backend connection
///
/// # Example
/// ```no_run
/// use tether_core_resilience::{ConnectionFactory, LifecycleManager, LifecycleError, RetryDefaults};
///
/// # async fn example<F: ConnectionFactory>(factory: F) -> Result<(), LifecycleError> {
/// let defaults = RetryDefaults::new(2, 2);
/// let mut manager = LifecycleManager::new(factory, None, &defaults);
///
/// manager.connect("mongodb://127.0.0.1:27017", "app").await?;
/// let _session = manager.session();
/// // ... hand out borrows to consumers ...
/// manager.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct LifecycleManager<F: ConnectionFactory> {
    factory: F,
    connect_budget: RetryBudget,
    disconnect_budget: RetryBudget,
    slot: Slot<F::Client, F::Session>,
}

impl<F: ConnectionFactory> LifecycleManager<F> {
    /// Create a manager, resolving each absent override against `defaults`
    pub fn new(factory: F, overrides: Option<RetryOverrides>, defaults: &RetryDefaults) -> Self {
        let (connect_budget, disconnect_budget) = overrides.unwrap_or_default().resolve(defaults);
        debug!(
            connect_retry = connect_budget.remaining(),
            disconnect_retry = disconnect_budget.remaining(),
            "Lifecycle manager created"
        );
        Self {
            factory,
            connect_budget,
            disconnect_budget,
            slot: Slot::Idle,
        }
    }

    /// Create a manager whose defaults are snapshotted from the environment now
    pub fn from_env(factory: F, overrides: Option<RetryOverrides>) -> Result<Self, DefaultsError> {
        let defaults = RetryDefaults::from_env()?;
        Ok(Self::new(factory, overrides, &defaults))
    }

    /// Connect to `uri` and select `resource`, retrying immediately on failure
    ///
    /// A successful attempt replaces any handle already held. On exhaustion
    /// the manager keeps whatever state it had before the call.
    pub async fn connect(&mut self, uri: &str, resource: &str) -> Result<(), LifecycleError> {
        if matches!(self.slot, Slot::Disconnected) {
            warn!(state = %self.state(), "Connect rejected");
            return Err(LifecycleError::Terminated);
        }

        let target = ConnectionTarget::new(uri, resource);
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            debug!(attempt = attempts, uri = %target.uri, resource = %target.resource, "Connecting to backend");

            match self.factory.connect(&target).await {
                Ok(connected) => {
                    if matches!(self.slot, Slot::Connected(_)) {
                        warn!("Replacing previously held backend connection");
                    }
                    self.slot = Slot::Connected(connected);
                    info!(
                        attempts,
                        connect_retry = self.connect_budget.remaining(),
                        "Backend connection established"
                    );
                    return Ok(());
                }
                Err(last) => {
                    if self.connect_budget.consume() {
                        warn!(
                            attempt = attempts,
                            remaining = self.connect_budget.remaining(),
                            error = %last,
                            "Connect attempt failed, retrying"
                        );
                        continue;
                    }
                    error!(attempts, error = %last, "Connect retry budget exhausted");
                    return Err(LifecycleError::ConnectionNotEstablished { attempts, last });
                }
            }
        }
    }

    /// Close the held client, retrying immediately on failure
    ///
    /// On exhaustion the handle stays held and reachable through the
    /// accessors.
    pub async fn disconnect(&mut self) -> Result<(), LifecycleError> {
        let connected = match &self.slot {
            Slot::Connected(connected) => connected,
            Slot::Idle => return Err(LifecycleError::NotConnected),
            Slot::Disconnected => return Err(LifecycleError::Terminated),
        };

        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            debug!(attempt = attempts, "Closing backend connection");

            match connected.client.close().await {
                Ok(()) => break,
                Err(last) => {
                    if self.disconnect_budget.consume() {
                        warn!(
                            attempt = attempts,
                            remaining = self.disconnect_budget.remaining(),
                            error = %last,
                            "Close attempt failed, retrying"
                        );
                        continue;
                    }
                    error!(attempts, error = %last, "Disconnect retry budget exhausted");
                    return Err(LifecycleError::ConnectionClose { attempts, last });
                }
            }
        }

        self.slot = Slot::Disconnected;
        info!(
            attempts,
            disconnect_retry = self.disconnect_budget.remaining(),
            "Backend connection closed"
        );
        Ok(())
    }

    /// Borrow the held client, if any
    pub fn connection(&self) -> Option<&F::Client> {
        match &self.slot {
            Slot::Connected(connected) => Some(&connected.client),
            _ => None,
        }
    }

    /// Borrow the selected sub-resource, if any
    pub fn session(&self) -> Option<&F::Session> {
        match &self.slot {
            Slot::Connected(connected) => Some(&connected.session),
            _ => None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.slot {
            Slot::Idle => LifecycleState::Idle,
            Slot::Connected(_) => LifecycleState::Connected,
            Slot::Disconnected => LifecycleState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LifecycleState::Connected
    }

    /// Connect retries still available
    pub fn connect_retries(&self) -> u32 {
        self.connect_budget.remaining()
    }

    /// Disconnect retries still available
    pub fn disconnect_retries(&self) -> u32 {
        self.disconnect_budget.remaining()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}
