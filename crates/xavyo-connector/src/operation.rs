//! Connector operation types
//!
//! Attribute sets, values, modifications, search filters and the resource
//! object shape exchanged through the connector contract. Attributes are
//! keyed by their schema [`QName`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use xavyo_schema::{QName, ResourceObjectDefinition};

/// A set of attributes of one resource object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    #[serde(flatten)]
    attributes: BTreeMap<QName, AttributeValue>,
}

impl AttributeSet {
    /// Create a new empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value.
    pub fn set(&mut self, name: QName, value: impl Into<AttributeValue>) {
        self.attributes.insert(name, value.into());
    }

    /// Set an attribute using builder pattern.
    #[must_use]
    pub fn with(mut self, name: QName, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &QName) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get a single-valued string attribute.
    #[must_use]
    pub fn get_string(&self, name: &QName) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_string)
    }

    /// Get a multi-valued string attribute.
    #[must_use]
    pub fn get_strings(&self, name: &QName) -> Option<Vec<&str>> {
        self.get(name).map(AttributeValue::as_strings)
    }

    #[must_use]
    pub fn has(&self, name: &QName) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn remove(&mut self, name: &QName) -> Option<AttributeValue> {
        self.attributes.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &QName> {
        self.attributes.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QName, &AttributeValue)> {
        self.attributes.iter()
    }

    /// Keep only the named attributes.
    #[must_use]
    pub fn project(&self, names: &[QName]) -> AttributeSet {
        self.attributes
            .iter()
            .filter(|(name, _)| names.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Check that every attribute of `other` is present here with an equal value.
    #[must_use]
    pub fn contains_all(&self, other: &AttributeSet) -> bool {
        other
            .iter()
            .all(|(name, value)| self.get(name).is_some_and(|v| v == value))
    }

    /// Apply one modification in place.
    pub fn apply(&mut self, modification: &AttributeModification) {
        match modification {
            AttributeModification::Replace { attribute, values } => {
                if values.is_empty() {
                    self.attributes.remove(attribute);
                } else {
                    self.set(attribute.clone(), AttributeValue::from_values(values.clone()));
                }
            }
            AttributeModification::Add { attribute, values } => {
                let mut current = self
                    .attributes
                    .remove(attribute)
                    .map(AttributeValue::into_values)
                    .unwrap_or_default();
                for value in values {
                    if !current.contains(value) {
                        current.push(value.clone());
                    }
                }
                if !current.is_empty() {
                    self.set(attribute.clone(), AttributeValue::from_values(current));
                }
            }
            AttributeModification::Remove { attribute, values } => {
                if let Some(existing) = self.attributes.remove(attribute) {
                    let remaining: Vec<AttributeValue> = existing
                        .into_values()
                        .into_iter()
                        .filter(|v| !values.contains(v))
                        .collect();
                    if !remaining.is_empty() {
                        self.set(attribute.clone(), AttributeValue::from_values(remaining));
                    }
                }
            }
        }
    }
}

impl FromIterator<(QName, AttributeValue)> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = (QName, AttributeValue)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

/// A value for an attribute, which may be single or multi-valued.
///
/// Serialized untagged. Binary values use the `{"$binary": "<base64>"}`
/// form so they never read back as arrays of integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    String(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
    Binary(#[serde(with = "binary")] Vec<u8>),
    /// Multiple values.
    Array(Vec<AttributeValue>),
    Object(serde_json::Map<String, Value>),
}

mod binary {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Encoded {
        #[serde(rename = "$binary")]
        data: String,
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        Encoded {
            data: STANDARD.encode(bytes),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Encoded::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.data)
            .map_err(serde::de::Error::custom)
    }
}

impl AttributeValue {
    /// Build a value from a list: one element stays single-valued.
    #[must_use]
    pub fn from_values(mut values: Vec<AttributeValue>) -> Self {
        if values.len() == 1 {
            values.remove(0)
        } else {
            AttributeValue::Array(values)
        }
    }

    /// Flatten into a list of single values.
    #[must_use]
    pub fn into_values(self) -> Vec<AttributeValue> {
        match self {
            AttributeValue::Array(values) => values,
            AttributeValue::Null => Vec::new(),
            single => vec![single],
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as strings (works for both single and multi-valued).
    #[must_use]
    pub fn as_strings(&self) -> Vec<&str> {
        match self {
            AttributeValue::String(s) => vec![s.as_str()],
            AttributeValue::Array(arr) => arr.iter().filter_map(AttributeValue::as_string).collect(),
            _ => vec![],
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, AttributeValue::Array(_))
    }

    /// Textual forms of the scalar values, used by in-memory filtering.
    fn texts(&self) -> Vec<String> {
        match self {
            AttributeValue::String(s) => vec![s.clone()],
            AttributeValue::Integer(i) => vec![i.to_string()],
            AttributeValue::Boolean(b) => vec![b.to_string()],
            AttributeValue::Float(f) => vec![f.to_string()],
            AttributeValue::Array(values) => values.iter().flat_map(AttributeValue::texts).collect(),
            AttributeValue::Null | AttributeValue::Binary(_) | AttributeValue::Object(_) => {
                Vec::new()
            }
        }
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(bytes: Vec<u8>) -> Self {
        AttributeValue::Binary(bytes)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(values: Vec<&str>) -> Self {
        AttributeValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// One change to an attribute during a modify operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AttributeModification {
    /// Add values, keeping existing ones.
    Add {
        attribute: QName,
        values: Vec<AttributeValue>,
    },
    /// Remove the given values.
    Remove {
        attribute: QName,
        values: Vec<AttributeValue>,
    },
    /// Replace all values; an empty list clears the attribute.
    Replace {
        attribute: QName,
        values: Vec<AttributeValue>,
    },
}

impl AttributeModification {
    pub fn add(attribute: QName, value: impl Into<AttributeValue>) -> Self {
        AttributeModification::Add {
            attribute,
            values: value.into().into_values(),
        }
    }

    pub fn remove(attribute: QName, value: impl Into<AttributeValue>) -> Self {
        AttributeModification::Remove {
            attribute,
            values: value.into().into_values(),
        }
    }

    pub fn replace(attribute: QName, value: impl Into<AttributeValue>) -> Self {
        AttributeModification::Replace {
            attribute,
            values: value.into().into_values(),
        }
    }

    /// Replace with no values.
    #[must_use]
    pub fn clear(attribute: QName) -> Self {
        AttributeModification::Replace {
            attribute,
            values: Vec::new(),
        }
    }

    /// The modified attribute.
    #[must_use]
    pub fn attribute(&self) -> &QName {
        match self {
            AttributeModification::Add { attribute, .. }
            | AttributeModification::Remove { attribute, .. }
            | AttributeModification::Replace { attribute, .. } => attribute,
        }
    }
}

/// Search query over attribute names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Any value of the attribute equals `value`.
    Equals { attribute: QName, value: String },
    /// Any value of the attribute contains `value`.
    Contains { attribute: QName, value: String },
    /// Any value of the attribute starts with `value`.
    StartsWith { attribute: QName, value: String },
    /// The attribute has at least one value.
    Present { attribute: QName },
    And { filters: Vec<Filter> },
    Or { filters: Vec<Filter> },
    Not { filter: Box<Filter> },
}

impl Filter {
    pub fn eq(attribute: QName, value: impl Into<String>) -> Self {
        Filter::Equals {
            attribute,
            value: value.into(),
        }
    }

    pub fn contains(attribute: QName, value: impl Into<String>) -> Self {
        Filter::Contains {
            attribute,
            value: value.into(),
        }
    }

    pub fn starts_with(attribute: QName, value: impl Into<String>) -> Self {
        Filter::StartsWith {
            attribute,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn present(attribute: QName) -> Self {
        Filter::Present { attribute }
    }

    #[must_use]
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And { filters }
    }

    #[must_use]
    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or { filters }
    }

    /// Create a NOT filter (negation).
    #[must_use]
    pub fn negate(filter: Filter) -> Self {
        Filter::Not {
            filter: Box::new(filter),
        }
    }

    /// Combine this filter with another using AND.
    #[must_use]
    pub fn and_with(self, other: Filter) -> Self {
        match self {
            Filter::And { mut filters } => {
                filters.push(other);
                Filter::And { filters }
            }
            _ => Filter::And {
                filters: vec![self, other],
            },
        }
    }

    /// Evaluate the filter against an attribute set.
    ///
    /// For drivers whose resource cannot filter natively. An empty `And`
    /// matches everything, an empty `Or` matches nothing.
    #[must_use]
    pub fn matches(&self, attributes: &AttributeSet) -> bool {
        let texts = |attribute: &QName| {
            attributes
                .get(attribute)
                .map(AttributeValue::texts)
                .unwrap_or_default()
        };

        match self {
            Filter::Equals { attribute, value } => texts(attribute).iter().any(|t| t == value),
            Filter::Contains { attribute, value } => {
                texts(attribute).iter().any(|t| t.contains(value.as_str()))
            }
            Filter::StartsWith { attribute, value } => {
                texts(attribute).iter().any(|t| t.starts_with(value.as_str()))
            }
            Filter::Present { attribute } => attributes
                .get(attribute)
                .is_some_and(|v| !v.clone().into_values().is_empty()),
            Filter::And { filters } => filters.iter().all(|f| f.matches(attributes)),
            Filter::Or { filters } => filters.iter().any(|f| f.matches(attributes)),
            Filter::Not { filter } => !filter.matches(attributes),
        }
    }
}

/// A native object of some object class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    pub object_class: QName,
    pub attributes: AttributeSet,
}

impl ResourceObject {
    #[must_use]
    pub fn new(object_class: QName, attributes: AttributeSet) -> Self {
        Self {
            object_class,
            attributes,
        }
    }

    /// The primary identifier attributes, as declared by the object class.
    #[must_use]
    pub fn identifiers_from(&self, definition: &ResourceObjectDefinition) -> AttributeSet {
        self.attributes.project(definition.identifier_names())
    }
}

/// Attributes a mutation reports as a side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "attributes", rename_all = "snake_case")]
pub enum AttributeReport {
    /// What the driver could report without an extra round trip (may be empty).
    Reported(AttributeSet),
    /// The driver does not report post-state; re-fetch if needed.
    NotSupported,
}

impl AttributeReport {
    /// Supported, nothing to report.
    #[must_use]
    pub fn empty() -> Self {
        AttributeReport::Reported(AttributeSet::new())
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, AttributeReport::Reported(_))
    }

    #[must_use]
    pub fn attributes(&self) -> Option<&AttributeSet> {
        match self {
            AttributeReport::Reported(attributes) => Some(attributes),
            AttributeReport::NotSupported => None,
        }
    }
}

/// When a script runs relative to the mutation it accompanies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTiming {
    Before,
    #[default]
    After,
}

/// A script executed on the resource as part of a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptOperation {
    /// Script language; `None` means the driver's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub code: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub timing: ScriptTiming,
}

impl ScriptOperation {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            language: None,
            code: code.into(),
            arguments: BTreeMap::new(),
            timing: ScriptTiming::default(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_argument(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Run the script before the mutation instead of after it.
    #[must_use]
    pub fn before(mut self) -> Self {
        self.timing = ScriptTiming::Before;
        self
    }
}

/// Work requested alongside `add_object`, `modify_object` or
/// `delete_object`.
///
/// Drivers that lack the matching capability reject the whole mutation
/// before touching the resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdditionalOperation {
    /// Requires [`Capability::Script`](crate::types::Capability::Script).
    Script(ScriptOperation),
}

impl AdditionalOperation {
    /// Scripts that run at `timing`, in request order.
    pub fn scripts(
        operations: &[AdditionalOperation],
        timing: ScriptTiming,
    ) -> impl Iterator<Item = &ScriptOperation> {
        operations
            .iter()
            .map(|op| match op {
                AdditionalOperation::Script(script) => script,
            })
            .filter(move |script| script.timing == timing)
    }
}

impl From<ScriptOperation> for AdditionalOperation {
    fn from(script: ScriptOperation) -> Self {
        AdditionalOperation::Script(script)
    }
}
