//! Minimal owned XML tree
//!
//! Built from `quick-xml` events. Each element keeps the namespace prefixes
//! in scope at its position so QName-valued attributes (`type`, `ref`, `base`)
//! can be resolved after parsing.

use std::collections::BTreeMap;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{SchemaError, SchemaResult};
use crate::qname::QName;

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

type Scope = Arc<BTreeMap<String, String>>;

/// An element of a parsed XML document.
#[derive(Debug, Clone)]
pub struct XmlElement {
    name: QName,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
    scope: Scope,
}

impl XmlElement {
    /// Resolved name of this element.
    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Check the element name against a namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.name.namespace() == namespace && self.name.local_name() == local_name
    }

    /// Get an attribute value by its literal (unprefixed) name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content directly inside this element, trimmed.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Child elements in document order.
    #[must_use]
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First child element with the given name.
    #[must_use]
    pub fn first_child(&self, namespace: &str, local_name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|child| child.is(namespace, local_name))
    }

    /// All descendant elements with the given name, in document order.
    #[must_use]
    pub fn descendants(&self, namespace: &str, local_name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(namespace, local_name, &mut found);
        found
    }

    fn collect_descendants<'a>(
        &'a self,
        namespace: &str,
        local_name: &str,
        found: &mut Vec<&'a XmlElement>,
    ) {
        for child in &self.children {
            if child.is(namespace, local_name) {
                found.push(child);
            }
            child.collect_descendants(namespace, local_name, found);
        }
    }

    /// Namespace bound to a prefix at this element (`""` is the default namespace).
    #[must_use]
    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.scope.get(prefix).map(String::as_str)
    }

    /// Resolve a prefixed value such as `xsd:string` against the prefixes in scope.
    ///
    /// Unprefixed values take the default namespace. Returns `None` when the
    /// prefix is not declared.
    #[must_use]
    pub fn resolve_qname(&self, value: &str) -> Option<QName> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match value.split_once(':') {
            Some((prefix, local)) if !local.is_empty() => self
                .namespace_for_prefix(prefix)
                .map(|ns| QName::new(ns, local)),
            Some(_) => None,
            None => Some(QName::new(
                self.namespace_for_prefix("").unwrap_or_default(),
                value,
            )),
        }
    }
}

/// Parse an XML document into its root element.
pub fn parse_document(xml: &str) -> SchemaResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let base_scope: Scope = Arc::new(BTreeMap::from([("xml".to_string(), XML_NS.to_string())]));
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let parent_scope = stack.last().map_or(&base_scope, |parent| &parent.scope);
                let element = open_element(&start, parent_scope)?;
                stack.push(element);
            }
            Ok(Event::Empty(start)) => {
                let parent_scope = stack.last().map_or(&base_scope, |parent| &parent.scope);
                let element = open_element(&start, parent_scope)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| SchemaError::xml("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(current) = stack.last_mut() {
                    let value = text
                        .unescape()
                        .map_err(|e| SchemaError::xml_with_source("invalid text content", e))?;
                    current.text.push_str(&value);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SchemaError::xml_with_source(
                    format!("parse error at position {}", reader.buffer_position()),
                    e,
                ));
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SchemaError::xml("unexpected end of document"));
    }

    root.ok_or_else(|| SchemaError::xml("document has no root element"))
}

fn open_element(start: &BytesStart<'_>, parent_scope: &Scope) -> SchemaResult<XmlElement> {
    let mut attributes = Vec::new();
    let mut declarations = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| SchemaError::xml_with_source("invalid attribute", e.into()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SchemaError::xml_with_source("invalid attribute value", e))?
            .into_owned();

        if key == "xmlns" {
            declarations.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declarations.push((prefix.to_string(), value));
        } else {
            attributes.push((key, value));
        }
    }

    let scope = if declarations.is_empty() {
        Arc::clone(parent_scope)
    } else {
        let mut map = (**parent_scope).clone();
        map.extend(declarations);
        Arc::new(map)
    };

    let raw_name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let name = match raw_name.split_once(':') {
        Some((prefix, local)) => {
            let namespace = scope.get(prefix).ok_or_else(|| {
                SchemaError::xml(format!("undeclared namespace prefix '{prefix}'"))
            })?;
            QName::new(namespace.as_str(), local)
        }
        None => QName::new(scope.get("").cloned().unwrap_or_default(), raw_name),
    };

    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
        scope,
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> SchemaResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(SchemaError::xml("document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}
