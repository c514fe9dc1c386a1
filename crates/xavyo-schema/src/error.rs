//! Schema construction error types
//!
//! Only structurally fatal conditions surface as errors. Everything else the
//! builder encounters in an externally authored schema degrades silently.

use thiserror::Error;

/// Error that aborts schema construction.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The input is not well-formed XML.
    #[error("malformed schema document: {message}")]
    Xml {
        message: String,
        #[source]
        source: Option<quick_xml::Error>,
    },

    /// The document root is not an `xsd:schema` element.
    #[error("document root is not an XML Schema element (found '{found}')")]
    NotASchema { found: String },

    /// The schema has no target namespace declaration.
    #[error("schema does not have a targetNamespace declaration")]
    MissingNamespace,

    /// A top-level element whose type cannot be determined at all.
    #[error("element {element} has no determinable type: {reason}")]
    UndeterminedType { element: String, reason: String },

    /// A qualified name could not be parsed.
    #[error("invalid qualified name '{value}'")]
    InvalidQName { value: String },

    /// I/O failure while reading a schema file.
    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Get an error code for classification.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            SchemaError::Xml { .. } => "SCHEMA_XML",
            SchemaError::NotASchema { .. } => "SCHEMA_NOT_XSD",
            SchemaError::MissingNamespace => "SCHEMA_MISSING_NAMESPACE",
            SchemaError::UndeterminedType { .. } => "SCHEMA_UNDETERMINED_TYPE",
            SchemaError::InvalidQName { .. } => "SCHEMA_INVALID_QNAME",
            SchemaError::Io(_) => "SCHEMA_IO",
        }
    }

    /// Create an XML error without an underlying parser error.
    pub fn xml(message: impl Into<String>) -> Self {
        SchemaError::Xml {
            message: message.into(),
            source: None,
        }
    }

    /// Create an XML error wrapping the parser error.
    pub fn xml_with_source(message: impl Into<String>, source: quick_xml::Error) -> Self {
        SchemaError::Xml {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an undetermined type error.
    pub fn undetermined_type(element: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::UndeterminedType {
            element: element.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaError::MissingNamespace.error_code(),
            "SCHEMA_MISSING_NAMESPACE"
        );
        assert_eq!(SchemaError::xml("boom").error_code(), "SCHEMA_XML");
    }

    #[test]
    fn test_error_display() {
        let err = SchemaError::undetermined_type("{urn:test}account", "no type attribute");
        assert_eq!(
            err.to_string(),
            "element {urn:test}account has no determinable type: no type attribute"
        );
    }
}
