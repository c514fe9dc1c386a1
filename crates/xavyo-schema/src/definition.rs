//! Schema definition model
//!
//! The typed output of the schema builder: complex types, property
//! containers, properties, and their resource-aware variants. Definitions
//! are immutable once the builder hands them out; complex types are shared
//! between containers through [`Arc`].

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::qname::QName;

/// Upper occurrence bound of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    /// At most this many values.
    Bounded(u32),
    /// Any number of values.
    Unbounded,
}

impl MaxOccurs {
    /// Whether more than one value is allowed.
    #[must_use]
    pub fn is_multi_valued(&self) -> bool {
        match self {
            MaxOccurs::Bounded(n) => *n > 1,
            MaxOccurs::Unbounded => true,
        }
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        MaxOccurs::Bounded(1)
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxOccurs::Bounded(n) => write!(f, "{n}"),
            MaxOccurs::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl Serialize for MaxOccurs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MaxOccurs::Bounded(n) => serializer.serialize_u32(*n),
            MaxOccurs::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

/// Access flags of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Access {
    pub create: bool,
    pub read: bool,
    pub update: bool,
}

impl Access {
    /// No access at all; the starting point when access flags are listed explicitly.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            create: false,
            read: false,
            update: false,
        }
    }

    /// Grant one access flag by its annotation keyword.
    ///
    /// Returns `false` if the keyword is not recognised.
    pub fn grant(&mut self, keyword: &str) -> bool {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "create" => self.create = true,
            "read" => self.read = true,
            "update" => self.update = true,
            _ => return false,
        }
        true
    }
}

impl Default for Access {
    fn default() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
        }
    }
}

/// Kind of a property definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyKind {
    /// A property of a non-resource complex type.
    Plain,
    /// An attribute of a resource object class.
    ResourceAttribute {
        /// The resource's own name for the attribute.
        #[serde(skip_serializing_if = "Option::is_none")]
        native_attribute_name: Option<String>,
    },
}

/// A named, typed leaf value.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyDefinition {
    name: QName,
    type_name: QName,
    min_occurs: u32,
    max_occurs: MaxOccurs,
    access: Access,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
    ignored: bool,
    #[serde(rename = "property_kind")]
    kind: PropertyKind,
}

impl PropertyDefinition {
    /// Create a single-valued, required, fully accessible plain property.
    #[must_use]
    pub fn new(name: QName, type_name: QName) -> Self {
        Self {
            name,
            type_name,
            min_occurs: 1,
            max_occurs: MaxOccurs::default(),
            access: Access::default(),
            display_name: None,
            help: None,
            ignored: false,
            kind: PropertyKind::Plain,
        }
    }

    /// Set occurrence bounds.
    #[must_use]
    pub fn with_occurs(mut self, min_occurs: u32, max_occurs: MaxOccurs) -> Self {
        self.min_occurs = min_occurs;
        self.max_occurs = max_occurs;
        self
    }

    /// Set access flags.
    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the help text.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Mark as ignored.
    #[must_use]
    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Turn into a resource object attribute.
    #[must_use]
    pub fn as_resource_attribute(mut self, native_attribute_name: Option<String>) -> Self {
        self.kind = PropertyKind::ResourceAttribute {
            native_attribute_name,
        };
        self
    }

    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    #[must_use]
    pub fn type_name(&self) -> &QName {
        &self.type_name
    }

    #[must_use]
    pub fn min_occurs(&self) -> u32 {
        self.min_occurs
    }

    #[must_use]
    pub fn max_occurs(&self) -> MaxOccurs {
        self.max_occurs
    }

    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    #[must_use]
    pub fn can_create(&self) -> bool {
        self.access.create
    }

    #[must_use]
    pub fn can_read(&self) -> bool {
        self.access.read
    }

    #[must_use]
    pub fn can_update(&self) -> bool {
        self.access.update
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    #[must_use]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Whether this is an attribute of a resource object class.
    #[must_use]
    pub fn is_resource_attribute(&self) -> bool {
        matches!(self.kind, PropertyKind::ResourceAttribute { .. })
    }

    /// The resource's own name for this attribute, if declared.
    #[must_use]
    pub fn native_attribute_name(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::ResourceAttribute {
                native_attribute_name,
            } => native_attribute_name.as_deref(),
            PropertyKind::Plain => None,
        }
    }

    /// Whether more than one value is allowed.
    #[must_use]
    pub fn is_multi_valued(&self) -> bool {
        self.max_occurs.is_multi_valued()
    }

    /// Whether at least one value is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.min_occurs > 0
    }
}

/// A named aggregate of nested definitions.
#[derive(Debug, Clone, Serialize)]
pub struct ComplexTypeDefinition {
    name: QName,
    ignored: bool,
    definitions: Vec<Definition>,
}

impl ComplexTypeDefinition {
    /// Create an empty complex type.
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            ignored: false,
            definitions: Vec::new(),
        }
    }

    /// Mark as ignored.
    #[must_use]
    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Append a nested definition, keeping first-encounter order.
    pub fn push(&mut self, definition: Definition) {
        self.definitions.push(definition);
    }

    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Nested definitions in the order they were encountered.
    #[must_use]
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Nested property definitions.
    pub fn property_definitions(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.definitions.iter().filter_map(Definition::as_property)
    }

    /// Find a direct property member by name.
    #[must_use]
    pub fn find_property_definition(&self, name: &QName) -> Option<&PropertyDefinition> {
        self.property_definitions().find(|p| p.name() == name)
    }

    /// Find a direct container member by name.
    #[must_use]
    pub fn find_container_definition(&self, name: &QName) -> Option<&PropertyContainerDefinition> {
        self.definitions
            .iter()
            .filter_map(Definition::as_property_container)
            .find(|c| c.name() == name)
    }

    /// Whether the complex type has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Kind of a property container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// A nested structure.
    Container,
    /// A container whose type derives from the platform's root object type.
    Object,
}

/// An element-level wrapper binding a name to a complex type.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyContainerDefinition {
    name: QName,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_name: Option<QName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    complex_type: Option<Arc<ComplexTypeDefinition>>,
    ignored: bool,
    #[serde(rename = "container_kind")]
    kind: ContainerKind,
}

impl PropertyContainerDefinition {
    /// Create a container over a known complex type.
    #[must_use]
    pub fn new(name: QName, complex_type: Arc<ComplexTypeDefinition>) -> Self {
        Self {
            name,
            type_name: Some(complex_type.name().clone()),
            complex_type: Some(complex_type),
            ignored: false,
            kind: ContainerKind::Container,
        }
    }

    /// Create a container with unknown content (schemaless passthrough).
    #[must_use]
    pub fn schemaless(name: QName, type_name: Option<QName>) -> Self {
        Self {
            name,
            type_name,
            complex_type: None,
            ignored: false,
            kind: ContainerKind::Container,
        }
    }

    /// Mark as an object container.
    #[must_use]
    pub fn as_object(mut self) -> Self {
        self.kind = ContainerKind::Object;
        self
    }

    /// Mark as ignored.
    #[must_use]
    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    #[must_use]
    pub fn type_name(&self) -> Option<&QName> {
        self.type_name.as_ref()
    }

    /// The wrapped complex type; `None` for schemaless containers.
    #[must_use]
    pub fn complex_type(&self) -> Option<&Arc<ComplexTypeDefinition>> {
        self.complex_type.as_ref()
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    #[must_use]
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        self.kind == ContainerKind::Object
    }

    #[must_use]
    pub fn is_schemaless(&self) -> bool {
        self.complex_type.is_none()
    }
}

/// One native object class of a resource.
///
/// Identifier and attribute references are stored by name and resolved
/// against the owned complex type when read. References that do not point at
/// a resource attribute of that complex type are dropped when set.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceObjectDefinition {
    name: QName,
    #[serde(serialize_with = "serialize_type_name")]
    complex_type: Arc<ComplexTypeDefinition>,
    ignored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    native_object_class: Option<String>,
    account_type: bool,
    default_account_type: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name_attribute: Option<QName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    naming_attribute: Option<QName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description_attribute: Option<QName>,
    identifiers: Vec<QName>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    secondary_identifiers: Vec<QName>,
}

fn serialize_type_name<S: Serializer>(
    complex_type: &Arc<ComplexTypeDefinition>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    complex_type.name().serialize(serializer)
}

impl ResourceObjectDefinition {
    /// Create a resource object definition over a complex type, named after it.
    #[must_use]
    pub fn new(complex_type: Arc<ComplexTypeDefinition>) -> Self {
        Self {
            name: complex_type.name().clone(),
            complex_type,
            ignored: false,
            native_object_class: None,
            account_type: false,
            default_account_type: false,
            display_name_attribute: None,
            naming_attribute: None,
            description_attribute: None,
            identifiers: Vec::new(),
            secondary_identifiers: Vec::new(),
        }
    }

    /// Set the native object class name.
    #[must_use]
    pub fn with_native_object_class(mut self, native_object_class: impl Into<String>) -> Self {
        self.native_object_class = Some(native_object_class.into());
        self
    }

    /// Set the legacy account classification.
    #[must_use]
    pub fn with_account_type(mut self, account_type: bool, default_account_type: bool) -> Self {
        self.account_type = account_type;
        self.default_account_type = account_type && default_account_type;
        self
    }

    /// Mark as ignored.
    #[must_use]
    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Set the display name attribute reference.
    #[must_use]
    pub fn with_display_name_attribute(mut self, name: QName) -> Self {
        self.display_name_attribute = self.checked_reference(name, "displayName");
        self
    }

    /// Set the naming attribute reference.
    #[must_use]
    pub fn with_naming_attribute(mut self, name: QName) -> Self {
        self.naming_attribute = self.checked_reference(name, "namingAttribute");
        self
    }

    /// Set the description attribute reference.
    #[must_use]
    pub fn with_description_attribute(mut self, name: QName) -> Self {
        self.description_attribute = self.checked_reference(name, "descriptionAttribute");
        self
    }

    /// Add a primary identifier reference.
    #[must_use]
    pub fn with_identifier(mut self, name: QName) -> Self {
        if let Some(name) = self.checked_reference(name, "identifier") {
            if !self.identifiers.contains(&name) {
                self.identifiers.push(name);
            }
        }
        self
    }

    /// Add a secondary identifier reference.
    #[must_use]
    pub fn with_secondary_identifier(mut self, name: QName) -> Self {
        if let Some(name) = self.checked_reference(name, "secondaryIdentifier") {
            if !self.secondary_identifiers.contains(&name) {
                self.secondary_identifiers.push(name);
            }
        }
        self
    }

    fn checked_reference(&self, name: QName, role: &str) -> Option<QName> {
        if self.find_attribute_definition(&name).is_some() {
            Some(name)
        } else {
            warn!(
                object_class = %self.name,
                attribute = %name,
                role,
                "Dropping reference to an attribute not defined in the object class"
            );
            None
        }
    }

    fn resolve(&self, name: Option<&QName>) -> Option<&PropertyDefinition> {
        name.and_then(|n| self.find_attribute_definition(n))
    }

    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The complex type shared with the plain complex type definition.
    #[must_use]
    pub fn complex_type(&self) -> &Arc<ComplexTypeDefinition> {
        &self.complex_type
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    #[must_use]
    pub fn native_object_class(&self) -> Option<&str> {
        self.native_object_class.as_deref()
    }

    #[must_use]
    pub fn is_account_type(&self) -> bool {
        self.account_type
    }

    #[must_use]
    pub fn is_default_account_type(&self) -> bool {
        self.default_account_type
    }

    /// Attributes of this object class.
    pub fn attribute_definitions(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.complex_type
            .property_definitions()
            .filter(|p| p.is_resource_attribute())
    }

    /// Find a resource attribute by name.
    #[must_use]
    pub fn find_attribute_definition(&self, name: &QName) -> Option<&PropertyDefinition> {
        self.complex_type
            .find_property_definition(name)
            .filter(|p| p.is_resource_attribute())
    }

    /// Find a resource attribute by its native name.
    #[must_use]
    pub fn find_attribute_by_native_name(&self, native_name: &str) -> Option<&PropertyDefinition> {
        self.attribute_definitions()
            .find(|p| p.native_attribute_name() == Some(native_name))
    }

    /// Primary identifiers, in declaration order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&PropertyDefinition> {
        self.identifiers
            .iter()
            .filter_map(|n| self.find_attribute_definition(n))
            .collect()
    }

    /// Names of the primary identifiers.
    #[must_use]
    pub fn identifier_names(&self) -> &[QName] {
        &self.identifiers
    }

    /// Secondary identifiers, in declaration order.
    #[must_use]
    pub fn secondary_identifiers(&self) -> Vec<&PropertyDefinition> {
        self.secondary_identifiers
            .iter()
            .filter_map(|n| self.find_attribute_definition(n))
            .collect()
    }

    /// Names of the secondary identifiers.
    #[must_use]
    pub fn secondary_identifier_names(&self) -> &[QName] {
        &self.secondary_identifiers
    }

    #[must_use]
    pub fn display_name_attribute(&self) -> Option<&PropertyDefinition> {
        self.resolve(self.display_name_attribute.as_ref())
    }

    #[must_use]
    pub fn naming_attribute(&self) -> Option<&PropertyDefinition> {
        self.resolve(self.naming_attribute.as_ref())
    }

    #[must_use]
    pub fn description_attribute(&self) -> Option<&PropertyDefinition> {
        self.resolve(self.description_attribute.as_ref())
    }

    /// Whether the attribute is a primary or secondary identifier.
    #[must_use]
    pub fn is_identifier(&self, name: &QName) -> bool {
        self.identifiers.contains(name) || self.secondary_identifiers.contains(name)
    }
}

/// A schema definition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Definition {
    ComplexType(Arc<ComplexTypeDefinition>),
    PropertyContainer(PropertyContainerDefinition),
    ResourceObject(ResourceObjectDefinition),
    Property(PropertyDefinition),
}

impl Definition {
    /// Qualified name of the definition.
    #[must_use]
    pub fn name(&self) -> &QName {
        match self {
            Definition::ComplexType(def) => def.name(),
            Definition::PropertyContainer(def) => def.name(),
            Definition::ResourceObject(def) => def.name(),
            Definition::Property(def) => def.name(),
        }
    }

    /// Whether the definition must not be surfaced to higher layers.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        match self {
            Definition::ComplexType(def) => def.is_ignored(),
            Definition::PropertyContainer(def) => def.is_ignored(),
            Definition::ResourceObject(def) => def.is_ignored(),
            Definition::Property(def) => def.is_ignored(),
        }
    }

    #[must_use]
    pub fn as_complex_type(&self) -> Option<&Arc<ComplexTypeDefinition>> {
        match self {
            Definition::ComplexType(def) => Some(def),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_property_container(&self) -> Option<&PropertyContainerDefinition> {
        match self {
            Definition::PropertyContainer(def) => Some(def),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_resource_object(&self) -> Option<&ResourceObjectDefinition> {
        match self {
            Definition::ResourceObject(def) => Some(def),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_property(&self) -> Option<&PropertyDefinition> {
        match self {
            Definition::Property(def) => Some(def),
            _ => None,
        }
    }
}

impl From<PropertyDefinition> for Definition {
    fn from(def: PropertyDefinition) -> Self {
        Definition::Property(def)
    }
}

impl From<PropertyContainerDefinition> for Definition {
    fn from(def: PropertyContainerDefinition) -> Self {
        Definition::PropertyContainer(def)
    }
}

impl From<ResourceObjectDefinition> for Definition {
    fn from(def: ResourceObjectDefinition) -> Self {
        Definition::ResourceObject(def)
    }
}

impl From<Arc<ComplexTypeDefinition>> for Definition {
    fn from(def: Arc<ComplexTypeDefinition>) -> Self {
        Definition::ComplexType(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(local: &str) -> QName {
        QName::new("urn:test", local)
    }

    fn string_type() -> QName {
        QName::new(crate::xsd::XSD_NS, "string")
    }

    fn account_type() -> Arc<ComplexTypeDefinition> {
        let mut ctd = ComplexTypeDefinition::new(q("AccountObjectClass"));
        ctd.push(
            PropertyDefinition::new(q("username"), string_type())
                .as_resource_attribute(Some("uid".to_string()))
                .into(),
        );
        ctd.push(
            PropertyDefinition::new(q("fullName"), string_type())
                .as_resource_attribute(None)
                .into(),
        );
        ctd.push(PropertyDefinition::new(q("plain"), string_type()).into());
        Arc::new(ctd)
    }

    #[test]
    fn test_access_defaults_and_grant() {
        let access = Access::default();
        assert!(access.create && access.read && access.update);

        let mut access = Access::none();
        assert!(access.grant("read"));
        assert!(!access.grant("delete"));
        assert_eq!(
            access,
            Access {
                create: false,
                read: true,
                update: false
            }
        );
    }

    #[test]
    fn test_max_occurs() {
        assert!(!MaxOccurs::Bounded(1).is_multi_valued());
        assert!(MaxOccurs::Bounded(3).is_multi_valued());
        assert!(MaxOccurs::Unbounded.is_multi_valued());
        assert_eq!(MaxOccurs::Unbounded.to_string(), "unbounded");
        assert_eq!(serde_json::to_string(&MaxOccurs::Bounded(2)).unwrap(), "2");
    }

    #[test]
    fn test_property_defaults() {
        let prop = PropertyDefinition::new(q("mail"), string_type());
        assert!(prop.is_required());
        assert!(!prop.is_multi_valued());
        assert!(!prop.is_ignored());
        assert!(!prop.is_resource_attribute());
        assert_eq!(prop.native_attribute_name(), None);
    }

    #[test]
    fn test_resource_object_references() {
        let rod = ResourceObjectDefinition::new(account_type())
            .with_identifier(q("username"))
            .with_identifier(q("username"))
            .with_secondary_identifier(q("missing"))
            .with_naming_attribute(q("username"))
            .with_display_name_attribute(q("plain"));

        assert_eq!(rod.name(), &q("AccountObjectClass"));
        assert_eq!(rod.identifier_names(), &[q("username")]);
        assert!(rod.secondary_identifiers().is_empty());
        assert_eq!(rod.naming_attribute().map(|p| p.name()), Some(&q("username")));
        // plain properties are not resource attributes
        assert!(rod.display_name_attribute().is_none());
        assert!(rod.is_identifier(&q("username")));
    }

    #[test]
    fn test_find_by_native_name() {
        let rod = ResourceObjectDefinition::new(account_type());
        let attr = rod.find_attribute_by_native_name("uid").unwrap();
        assert_eq!(attr.name(), &q("username"));
        assert_eq!(rod.attribute_definitions().count(), 2);
    }

    #[test]
    fn test_default_account_requires_account() {
        let rod = ResourceObjectDefinition::new(account_type()).with_account_type(false, true);
        assert!(!rod.is_default_account_type());
    }

    #[test]
    fn test_container_kinds() {
        let container = PropertyContainerDefinition::new(q("extension"), account_type());
        assert_eq!(container.type_name(), Some(&q("AccountObjectClass")));
        assert!(!container.is_object());

        let schemaless = PropertyContainerDefinition::schemaless(q("any"), None).as_object();
        assert!(schemaless.is_schemaless());
        assert!(schemaless.is_object());
    }

    #[test]
    fn test_definition_serializes_with_kind_tag() {
        let def: Definition = ResourceObjectDefinition::new(account_type())
            .with_identifier(q("username"))
            .into();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["kind"], "resource_object");
        assert_eq!(json["complex_type"], "{urn:test}AccountObjectClass");
        assert_eq!(json["identifiers"][0], "{urn:test}username");
    }

    #[test]
    fn test_property_and_container_keep_kind_tag() {
        let property: Definition = PropertyDefinition::new(q("uid"), QName::local("string"))
            .as_resource_attribute(Some("__UID__".to_string()))
            .into();
        let json = serde_json::to_value(&property).unwrap();
        assert_eq!(json["kind"], "property");
        assert_eq!(json["property_kind"]["type"], "resource_attribute");

        let container: Definition =
            PropertyContainerDefinition::new(q("extension"), account_type()).into();
        let json = serde_json::to_value(&container).unwrap();
        assert_eq!(json["kind"], "property_container");
        assert_eq!(json["container_kind"], "container");
    }
}
