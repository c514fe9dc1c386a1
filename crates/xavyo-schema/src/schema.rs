//! The schema container
//!
//! A [`Schema`] owns every definition built for one namespace. It is
//! assembled once by the builder and read-only afterward.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::definition::{
    ComplexTypeDefinition, Definition, PropertyContainerDefinition, PropertyDefinition,
    ResourceObjectDefinition,
};
use crate::error::{SchemaError, SchemaResult};
use crate::qname::QName;

/// A set of definitions sharing one namespace.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    namespace: String,
    definitions: Vec<Definition>,
}

impl Schema {
    /// Create a schema from definitions.
    ///
    /// Definitions outside `namespace` are left out. Fails if the namespace is
    /// empty.
    pub fn new(
        namespace: impl Into<String>,
        definitions: impl IntoIterator<Item = Definition>,
    ) -> SchemaResult<Self> {
        let namespace = namespace.into();
        if namespace.trim().is_empty() {
            return Err(SchemaError::MissingNamespace);
        }

        let definitions = definitions
            .into_iter()
            .filter(|def| {
                let inside = def.name().is_in(&namespace);
                if !inside {
                    debug!(definition = %def.name(), "Skipping definition outside the schema namespace");
                }
                inside
            })
            .collect();

        Ok(Self {
            namespace,
            definitions,
        })
    }

    /// The schema namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// All definitions in construction order.
    #[must_use]
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the schema has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions that are not marked ignored.
    pub fn visible_definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter().filter(|def| !def.is_ignored())
    }

    #[must_use]
    pub fn find_complex_type_definition(&self, name: &QName) -> Option<&Arc<ComplexTypeDefinition>> {
        self.definitions
            .iter()
            .filter_map(Definition::as_complex_type)
            .find(|def| def.name() == name)
    }

    #[must_use]
    pub fn find_container_definition(&self, name: &QName) -> Option<&PropertyContainerDefinition> {
        self.definitions
            .iter()
            .filter_map(Definition::as_property_container)
            .find(|def| def.name() == name)
    }

    #[must_use]
    pub fn find_property_definition(&self, name: &QName) -> Option<&PropertyDefinition> {
        self.definitions
            .iter()
            .filter_map(Definition::as_property)
            .find(|def| def.name() == name)
    }

    /// All resource object classes.
    pub fn resource_object_definitions(&self) -> impl Iterator<Item = &ResourceObjectDefinition> {
        self.definitions
            .iter()
            .filter_map(Definition::as_resource_object)
    }

    #[must_use]
    pub fn find_resource_object_definition(
        &self,
        name: &QName,
    ) -> Option<&ResourceObjectDefinition> {
        self.resource_object_definitions()
            .find(|def| def.name() == name)
    }

    /// Find a resource object class by its native object class name.
    #[must_use]
    pub fn find_resource_object_by_native_class(
        &self,
        native_object_class: &str,
    ) -> Option<&ResourceObjectDefinition> {
        self.resource_object_definitions()
            .find(|def| def.native_object_class() == Some(native_object_class))
    }

    /// The default account object class.
    ///
    /// Prefers the one flagged as default; falls back to the first account type.
    #[must_use]
    pub fn default_account_definition(&self) -> Option<&ResourceObjectDefinition> {
        self.resource_object_definitions()
            .find(|def| def.is_default_account_type())
            .or_else(|| {
                self.resource_object_definitions()
                    .find(|def| def.is_account_type())
            })
    }
}
