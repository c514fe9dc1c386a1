//! Connector configuration types
//!
//! Base trait for driver-specific configuration and the connection settings
//! shared by every driver.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConnectorError, ConnectorResult};
use crate::resilience::RetryConfig;

/// Trait for driver-specific configuration.
///
/// Drivers deserialize their configuration from JSON in `configure` and
/// validate its shape before storing it. Validation never contacts the
/// resource.
pub trait ConnectorConfig: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Validate the configuration.
    fn validate(&self) -> ConnectorResult<()>;

    /// Create a redacted version of this config (for logging/display).
    ///
    /// Sensitive fields should be replaced with placeholders.
    fn redacted(&self) -> Self;
}

/// Deserialize and validate a driver configuration.
///
/// Shape errors and validation failures both surface as
/// [`ConnectorError::Configuration`].
pub fn parse_config<C: ConnectorConfig>(value: &serde_json::Value) -> ConnectorResult<C> {
    let config: C = serde_json::from_value(value.clone())
        .map_err(|e| ConnectorError::configuration_with_source("malformed configuration", e))?;
    config.validate()?;
    Ok(config)
}

/// Common connection settings shared across drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Maximum retry attempts for communication failures on reads.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry delay in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_read_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: default_connection_timeout(),
            read_timeout_secs: default_read_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ConnectionSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_connection_timeout(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_read_timeout(mut self, secs: u64) -> Self {
        self.read_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Check the settings for values no driver can work with.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.connection_timeout_secs == 0 {
            return Err(ConnectorError::configuration(
                "connection_timeout_secs must be greater than zero",
            ));
        }
        if self.read_timeout_secs == 0 {
            return Err(ConnectorError::configuration(
                "read_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Retry policy for reads and the initial connection attempt.
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
            .with_max_retries(self.max_retries)
            .with_initial_delay(Duration::from_millis(self.retry_delay_ms))
    }
}
