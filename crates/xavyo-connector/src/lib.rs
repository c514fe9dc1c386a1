//! # Connector Contract
//!
//! The operation set every resource driver exposes to the provisioning
//! layer: lifecycle, schema retrieval, CRUD, search and incremental
//! change synchronization.
//!
//! Drivers implement [`ConnectorInstance`](traits::ConnectorInstance). Every
//! resource operation takes the
//! [`ResourceObjectDefinition`](xavyo_schema::ResourceObjectDefinition) the
//! caller works with, usually obtained from a schema built by
//! [`xavyo_schema::parse_schema`].
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_connector::prelude::*;
//!
//! let mut result = OperationResult::new("provision");
//! connector.configure(&config_json, &mut result).await?;
//! connector.initialize(&mut result).await?;
//!
//! let schema = connector.resource_schema(&mut result).await?.expect("schema");
//! let accounts = schema.default_account_definition().expect("account class");
//!
//! let token = connector.fetch_current_token(accounts, &mut result).await?;
//! // ... later
//! for change in connector.fetch_changes(accounts, Some(&token), &mut result).await? {
//!     persist(change.token.to_serialized());
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - The connector contract and search result handlers
//! - [`lifecycle`] - Reusable lifecycle state machine for drivers
//! - [`operation`] - Attribute sets, modifications, filters, resource objects
//! - [`change`] - Change and token model for synchronization
//! - [`result`] - Structured operation outcomes
//! - [`error`] - Error types with retry classification
//! - [`config`] - Driver configuration trait and shared connection settings
//! - [`resilience`] - Retry with exponential backoff for reads

pub mod change;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod operation;
pub mod resilience;
pub mod result;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use xavyo_connector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::types::{
        Capability, ChangeType, HandlerControl, LifecycleState, OperationStatus,
    };

    pub use crate::error::{ConnectorError, ConnectorResult};

    pub use crate::traits::{BoxedConnector, CollectingHandler, ConnectorInstance, ResultHandler};

    pub use crate::lifecycle::LifecycleTracker;

    pub use crate::operation::{
        AdditionalOperation, AttributeModification, AttributeReport, AttributeSet,
        AttributeValue, Filter, ResourceObject, ScriptOperation, ScriptTiming,
    };

    pub use crate::change::{Change, Token};

    pub use crate::result::OperationResult;

    pub use crate::config::{parse_config, ConnectionSettings, ConnectorConfig};

    pub use crate::resilience::{RetryConfig, RetryExecutor};

    pub use xavyo_schema::{QName, ResourceObjectDefinition, Schema};
}

// Re-export async_trait for driver implementors
pub use async_trait::async_trait;
