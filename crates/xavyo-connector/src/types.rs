//! Connector type definitions
//!
//! Enums shared by the connector contract: lifecycle states, native
//! capabilities, change classification and result status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a connector instance.
///
/// `Unconfigured → Configured → Initialized → Active`. A connector becomes
/// active on its first resource-accessing call after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Unconfigured,
    Configured,
    Initialized,
    Active,
}

impl LifecycleState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Unconfigured => "unconfigured",
            LifecycleState::Configured => "configured",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Active => "active",
        }
    }

    /// Check if resource-accessing calls are allowed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(self, LifecycleState::Initialized | LifecycleState::Active)
    }

    /// Check if configuration has been supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !matches!(self, LifecycleState::Unconfigured)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A native capability a driver can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Create,
    Read,
    Update,
    Delete,
    Search,
    LiveSync,
    TestConnection,
    /// Enable/disable of accounts.
    Activation,
    /// Password and credential management.
    Credentials,
    /// Execution of resource-side scripts.
    Script,
}

impl Capability {
    /// Get all capabilities.
    #[must_use]
    pub fn all() -> &'static [Capability] {
        &[
            Capability::Create,
            Capability::Read,
            Capability::Update,
            Capability::Delete,
            Capability::Search,
            Capability::LiveSync,
            Capability::TestConnection,
            Capability::Activation,
            Capability::Credentials,
            Capability::Script,
        ]
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Read => "read",
            Capability::Update => "update",
            Capability::Delete => "delete",
            Capability::Search => "search",
            Capability::LiveSync => "live_sync",
            Capability::TestConnection => "test_connection",
            Capability::Activation => "activation",
            Capability::Credentials => "credentials",
            Capability::Script => "script",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ParseCapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase();
        Capability::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseCapabilityError(s.to_string()))
    }
}

/// Error parsing a capability from string.
#[derive(Debug, Clone)]
pub struct ParseCapabilityError(String);

impl fmt::Display for ParseCapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid capability '{}'", self.0)
    }
}

impl std::error::Error for ParseCapabilityError {}

/// Classification of a detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
    /// The resource reported a change but not its kind.
    Unknown,
}

impl ChangeType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Update => "update",
            ChangeType::Delete => "delete",
            ChangeType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = ParseChangeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(ChangeType::Create),
            "update" => Ok(ChangeType::Update),
            "delete" => Ok(ChangeType::Delete),
            "unknown" => Ok(ChangeType::Unknown),
            _ => Err(ParseChangeTypeError(s.to_string())),
        }
    }
}

/// Error parsing a change type from string.
#[derive(Debug, Clone)]
pub struct ParseChangeTypeError(String);

impl fmt::Display for ParseChangeTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid change type '{}', expected one of: create, update, delete, unknown",
            self.0
        )
    }
}

impl std::error::Error for ParseChangeTypeError {}

/// Status of an operation result.
///
/// Ordered from best to worst so the worst of several statuses is the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    NotApplicable,
    Success,
    /// No outcome recorded yet.
    #[default]
    Unknown,
    PartialError,
    FatalError,
}

impl OperationStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::NotApplicable => "not_applicable",
            OperationStatus::Success => "success",
            OperationStatus::Unknown => "unknown",
            OperationStatus::PartialError => "partial_error",
            OperationStatus::FatalError => "fatal_error",
        }
    }

    /// Check if the status reports an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            OperationStatus::PartialError | OperationStatus::FatalError
        )
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a search handler wants after receiving an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerControl {
    Continue,
    Stop,
}

impl HandlerControl {
    #[must_use]
    pub fn should_stop(&self) -> bool {
        matches!(self, HandlerControl::Stop)
    }
}

impl From<bool> for HandlerControl {
    /// `true` continues, `false` stops.
    fn from(proceed: bool) -> Self {
        if proceed {
            HandlerControl::Continue
        } else {
            HandlerControl::Stop
        }
    }
}
