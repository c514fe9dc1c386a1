//! Schema builder configuration

use serde::Deserialize;

use crate::annotation::{COMMON_NS, OBJECT_TYPE_LOCAL_NAME};
use crate::qname::QName;

/// Options controlling how a schema is built.
#[derive(Debug, Clone, Deserialize)]
pub struct BuilderOptions {
    /// Root object type of the platform. Members typed with it (or a
    /// descendant) are object references and are skipped.
    #[serde(default = "default_object_type")]
    pub object_type: QName,

    /// Whether resource annotations are honoured. When `false` no resource
    /// object definitions are produced and properties stay plain.
    #[serde(default = "default_true")]
    pub resource_schema: bool,
}

fn default_object_type() -> QName {
    QName::new(COMMON_NS, OBJECT_TYPE_LOCAL_NAME)
}

fn default_true() -> bool {
    true
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            object_type: default_object_type(),
            resource_schema: true,
        }
    }
}

impl BuilderOptions {
    /// Options for a plain, non-resource schema.
    #[must_use]
    pub fn non_resource() -> Self {
        Self {
            resource_schema: false,
            ..Self::default()
        }
    }

    /// Set the root object type.
    #[must_use]
    pub fn with_object_type(mut self, object_type: QName) -> Self {
        self.object_type = object_type;
        self
    }
}
