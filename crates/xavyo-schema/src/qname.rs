//! Qualified names
//!
//! Every definition, type reference and attribute is identified by a
//! namespace plus local name. The textual form is Clark notation
//! (`{namespace}local`), which is also the serialized form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    namespace: String,
    local_name: String,
}

impl QName {
    /// Create a new qualified name.
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Create a name without a namespace.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self::new(String::new(), local_name)
    }

    /// Get the namespace URI (empty for unqualified names).
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the local part.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Check if the name belongs to the given namespace.
    #[must_use]
    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace == namespace
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

impl FromStr for QName {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidQName {
            value: s.to_string(),
        };

        match s.strip_prefix('{') {
            Some(rest) => {
                let (namespace, local) = rest.split_once('}').ok_or_else(invalid)?;
                if local.is_empty() {
                    return Err(invalid());
                }
                Ok(QName::new(namespace, local))
            }
            None if s.is_empty() || s.contains('}') => Err(invalid()),
            None => Ok(QName::local(s)),
        }
    }
}

impl Serialize for QName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
