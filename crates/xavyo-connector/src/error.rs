//! Connector error types
//!
//! Error definitions with retry classification. Only communication failures
//! are retryable, and only for reads and initial connection attempts.

use thiserror::Error;
use xavyo_schema::SchemaError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error that can occur during connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Configuration is invalid or incomplete. Fatal to the instance.
    #[error("invalid configuration: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Resource unreachable or connection-level failure.
    #[error("communication failed: {message}")]
    Communication {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Driver-internal failure unrelated to the resource's data.
    #[error("connector framework error: {message}")]
    GenericFramework {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Native representation cannot be reconciled with the expected schema.
    #[error("schema mismatch: {message}")]
    Schema {
        message: String,
        #[source]
        source: Option<SchemaError>,
    },

    /// Target object does not exist on the resource.
    #[error("object not found: {identifier}")]
    ObjectNotFound { identifier: String },

    /// Object to create already exists on the resource.
    #[error("object already exists: {identifier}")]
    ObjectAlreadyExists { identifier: String },

    /// The resource refused the operation.
    #[error("security violation: {message}")]
    SecurityViolation { message: String },

    /// The contract was called out of order.
    #[error("illegal connector state: {message}")]
    IllegalState { message: String },
}

impl ConnectorError {
    /// Check if the failed call may be retried with backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConnectorError::Communication { .. })
    }

    /// Check if the error invalidates the connector instance.
    #[must_use]
    pub fn is_fatal_to_instance(&self) -> bool {
        matches!(self, ConnectorError::Configuration { .. })
    }

    /// Get an error code for classification.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::Configuration { .. } => "INVALID_CONFIG",
            ConnectorError::Communication { .. } => "COMMUNICATION_FAILED",
            ConnectorError::GenericFramework { .. } => "FRAMEWORK_ERROR",
            ConnectorError::Schema { .. } => "SCHEMA_MISMATCH",
            ConnectorError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            ConnectorError::ObjectAlreadyExists { .. } => "OBJECT_EXISTS",
            ConnectorError::SecurityViolation { .. } => "SECURITY_VIOLATION",
            ConnectorError::IllegalState { .. } => "ILLEGAL_STATE",
        }
    }

    // Convenience constructors

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        ConnectorError::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source.
    pub fn configuration_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        ConnectorError::Communication {
            message: message.into(),
            source: None,
        }
    }

    /// Create a communication error with source.
    pub fn communication_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::Communication {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a framework error.
    pub fn generic_framework(message: impl Into<String>) -> Self {
        ConnectorError::GenericFramework {
            message: message.into(),
            source: None,
        }
    }

    /// Create a framework error with source.
    pub fn generic_framework_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::GenericFramework {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a schema mismatch error.
    pub fn schema(message: impl Into<String>) -> Self {
        ConnectorError::Schema {
            message: message.into(),
            source: None,
        }
    }

    /// Create an object not found error.
    pub fn object_not_found(identifier: impl Into<String>) -> Self {
        ConnectorError::ObjectNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create an object already exists error.
    pub fn object_already_exists(identifier: impl Into<String>) -> Self {
        ConnectorError::ObjectAlreadyExists {
            identifier: identifier.into(),
        }
    }

    /// Create a security violation error.
    pub fn security_violation(message: impl Into<String>) -> Self {
        ConnectorError::SecurityViolation {
            message: message.into(),
        }
    }

    /// Create an illegal state error.
    pub fn illegal_state(message: impl Into<String>) -> Self {
        ConnectorError::IllegalState {
            message: message.into(),
        }
    }
}

impl From<SchemaError> for ConnectorError {
    fn from(err: SchemaError) -> Self {
        ConnectorError::Schema {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
