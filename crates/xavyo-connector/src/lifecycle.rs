//! Lifecycle enforcement for connector instances.
//!
//! Drivers embed a [`LifecycleTracker`] and call its `ensure_*` guards at the
//! top of each contract operation.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ConnectorError, ConnectorResult};
use crate::types::LifecycleState;

/// Internally synchronized lifecycle state machine.
///
/// `Unconfigured → Configured → Initialized → Active`. Re-configuring resets
/// the instance to `Configured`, so `initialize` must run again before any
/// resource access. Re-initializing an initialized instance is allowed and
/// refreshes whatever the driver caches.
#[derive(Debug, Clone, Default)]
pub struct LifecycleTracker {
    state: Arc<RwLock<LifecycleState>>,
}

impl LifecycleTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Record that a valid configuration was stored.
    pub async fn mark_configured(&self) {
        let mut state = self.state.write().await;
        let previous = *state;
        *state = LifecycleState::Configured;
        info!(from = %previous, "Connector configured");
    }

    /// Record a successful `initialize`. Fails unless configured.
    pub async fn mark_initialized(&self) -> ConnectorResult<()> {
        let mut state = self.state.write().await;
        if !state.is_configured() {
            return Err(ConnectorError::illegal_state(
                "initialize called before configure",
            ));
        }
        let previous = *state;
        *state = LifecycleState::Initialized;
        if previous.is_initialized() {
            info!("Connector re-initialized");
        } else {
            info!("Connector initialized");
        }
        Ok(())
    }

    /// Guard for resource-accessing calls. Moves `Initialized` to `Active`.
    pub async fn mark_active(&self) -> ConnectorResult<()> {
        let mut state = self.state.write().await;
        match *state {
            LifecycleState::Active => Ok(()),
            LifecycleState::Initialized => {
                *state = LifecycleState::Active;
                debug!("Connector active");
                Ok(())
            }
            other => Err(not_initialized(other)),
        }
    }

    /// Guard for calls that need configuration but no resource access.
    pub async fn ensure_configured(&self) -> ConnectorResult<()> {
        let state = self.state().await;
        if state.is_configured() {
            Ok(())
        } else {
            Err(ConnectorError::illegal_state("connector is not configured"))
        }
    }

    /// Guard for calls that must follow `initialize`.
    pub async fn ensure_initialized(&self) -> ConnectorResult<()> {
        let state = self.state().await;
        if state.is_initialized() {
            Ok(())
        } else {
            Err(not_initialized(state))
        }
    }
}

fn not_initialized(state: LifecycleState) -> ConnectorError {
    ConnectorError::illegal_state(format!("connector is {state}, initialize must be called first"))
}
