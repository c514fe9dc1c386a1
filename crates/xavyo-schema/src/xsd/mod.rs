//! XML Schema structural description
//!
//! Reads XML Schema text into an [`XsdDocument`]: the named complex and simple
//! types, the top-level element declarations, and for each type a flattened
//! particle tree. Only the parts the schema builder classifies are modelled;
//! attributes, facets, named groups and imports are skipped.

pub mod dom;

use tracing::debug;

use crate::annotation::Annotation;
use crate::definition::MaxOccurs;
use crate::error::{SchemaError, SchemaResult};
use crate::qname::QName;
use dom::XmlElement;

/// The XML Schema namespace.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// `xsd:anyType`, the root of every complex type.
#[must_use]
pub fn any_type() -> QName {
    QName::new(XSD_NS, "anyType")
}

/// `xsd:anySimpleType`, the root of every simple type.
#[must_use]
pub fn any_simple_type() -> QName {
    QName::new(XSD_NS, "anySimpleType")
}

/// A parsed XML Schema document.
#[derive(Debug, Clone)]
pub struct XsdDocument {
    target_namespace: Option<String>,
    complex_types: Vec<XsdType>,
    simple_types: Vec<XsdType>,
    elements: Vec<XsdElement>,
}

/// A complex or simple type declaration, named or anonymous.
#[derive(Debug, Clone)]
pub struct XsdType {
    name: Option<QName>,
    simple: bool,
    base: Option<QName>,
    annotation: Option<Annotation>,
    particles: Vec<XsdParticle>,
}

/// A member of a content model.
#[derive(Debug, Clone)]
pub enum XsdParticle {
    /// An element declaration or element reference.
    Element(XsdElement),
    /// A nested `sequence`, `choice` or `all`.
    Group(Vec<XsdParticle>),
    /// An `xsd:any` wildcard.
    Wildcard,
}

/// How an element declares its type.
#[derive(Debug, Clone)]
pub enum XsdTypeRef {
    /// `type="prefix:Name"`.
    Named(QName),
    /// Inline `complexType` or `simpleType` without a name.
    Anonymous(Box<XsdType>),
    /// Element reference; the type comes from the referenced declaration.
    Missing,
    /// A `type` attribute whose prefix is not declared.
    Unresolvable(String),
}

/// An element declaration, top-level or local.
#[derive(Debug, Clone)]
pub struct XsdElement {
    name: Option<QName>,
    reference: Option<QName>,
    type_ref: XsdTypeRef,
    min_occurs: u32,
    max_occurs: MaxOccurs,
    annotation: Option<Annotation>,
}

impl XsdDocument {
    /// Parse XML Schema text.
    pub fn parse(xml: &str) -> SchemaResult<Self> {
        let root = dom::parse_document(xml)?;
        Self::from_element(&root)
    }

    /// Read the structural description from an already parsed `xsd:schema` element.
    pub fn from_element(root: &XmlElement) -> SchemaResult<Self> {
        if !root.is(XSD_NS, "schema") {
            return Err(SchemaError::NotASchema {
                found: root.name().to_string(),
            });
        }

        let target_namespace = root
            .attribute("targetNamespace")
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        let reader = Reader {
            target_namespace: target_namespace.clone().unwrap_or_default(),
        };

        let mut document = XsdDocument {
            target_namespace,
            complex_types: Vec::new(),
            simple_types: Vec::new(),
            elements: Vec::new(),
        };

        for child in root.children() {
            if child.name().namespace() != XSD_NS {
                continue;
            }
            match child.name().local_name() {
                "complexType" | "simpleType" => {
                    let Some(name) = child.attribute("name") else {
                        debug!("Skipping top-level type declaration without a name");
                        continue;
                    };
                    let ty = reader.read_type(child, Some(reader.qualify(name)));
                    if ty.simple {
                        document.simple_types.push(ty);
                    } else {
                        document.complex_types.push(ty);
                    }
                }
                "element" => document.elements.push(reader.read_element(child)),
                other => debug!(declaration = other, "Skipping top-level declaration"),
            }
        }

        Ok(document)
    }

    /// The declared target namespace, if any.
    #[must_use]
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Top-level named complex types in document order.
    #[must_use]
    pub fn complex_types(&self) -> &[XsdType] {
        &self.complex_types
    }

    /// Top-level named simple types in document order.
    #[must_use]
    pub fn simple_types(&self) -> &[XsdType] {
        &self.simple_types
    }

    /// Top-level element declarations in document order.
    #[must_use]
    pub fn elements(&self) -> &[XsdElement] {
        &self.elements
    }

    /// Find a top-level complex type by name.
    #[must_use]
    pub fn complex_type(&self, name: &QName) -> Option<&XsdType> {
        self.complex_types
            .iter()
            .find(|ty| ty.name.as_ref() == Some(name))
    }

    /// Find a top-level type (complex or simple) by name.
    #[must_use]
    pub fn find_type(&self, name: &QName) -> Option<&XsdType> {
        self.complex_type(name).or_else(|| {
            self.simple_types
                .iter()
                .find(|ty| ty.name.as_ref() == Some(name))
        })
    }

    /// Find a top-level element declaration by name.
    #[must_use]
    pub fn element(&self, name: &QName) -> Option<&XsdElement> {
        self.elements
            .iter()
            .find(|element| element.name.as_ref() == Some(name))
    }
}

impl XsdType {
    /// Type name; `None` for anonymous types.
    #[must_use]
    pub fn name(&self) -> Option<&QName> {
        self.name.as_ref()
    }

    /// Whether this is a simple type.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.simple
    }

    /// The type this one derives from.
    #[must_use]
    pub fn base(&self) -> Option<&QName> {
        self.base.as_ref()
    }

    /// Annotation attached to the type declaration.
    #[must_use]
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// Content model particles declared directly on this type.
    #[must_use]
    pub fn particles(&self) -> &[XsdParticle] {
        &self.particles
    }
}

impl XsdElement {
    /// Element name; `None` for element references.
    #[must_use]
    pub fn name(&self) -> Option<&QName> {
        self.name.as_ref()
    }

    /// Referenced top-level element (`ref="..."`).
    #[must_use]
    pub fn reference(&self) -> Option<&QName> {
        self.reference.as_ref()
    }

    /// How the element declares its type.
    #[must_use]
    pub fn type_ref(&self) -> &XsdTypeRef {
        &self.type_ref
    }

    /// Minimum occurrence.
    #[must_use]
    pub fn min_occurs(&self) -> u32 {
        self.min_occurs
    }

    /// Maximum occurrence.
    #[must_use]
    pub fn max_occurs(&self) -> MaxOccurs {
        self.max_occurs
    }

    /// Annotation attached to the element declaration.
    #[must_use]
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }
}

struct Reader {
    target_namespace: String,
}

impl Reader {
    fn qualify(&self, local_name: &str) -> QName {
        QName::new(self.target_namespace.as_str(), local_name.trim())
    }

    fn read_annotation(element: &XmlElement) -> Option<Annotation> {
        element
            .first_child(XSD_NS, "annotation")
            .cloned()
            .map(Annotation::new)
    }

    fn read_type(&self, element: &XmlElement, name: Option<QName>) -> XsdType {
        let simple = element.is(XSD_NS, "simpleType");
        let mut ty = XsdType {
            name,
            simple,
            base: None,
            annotation: Self::read_annotation(element),
            particles: Vec::new(),
        };

        if simple {
            ty.base = element
                .first_child(XSD_NS, "restriction")
                .and_then(|r| r.attribute("base"))
                .and_then(|base| element.resolve_qname(base))
                .or_else(|| Some(any_simple_type()));
            return ty;
        }

        for child in element.children() {
            if child.name().namespace() != XSD_NS {
                continue;
            }
            match child.name().local_name() {
                "sequence" | "choice" | "all" => ty.particles.push(self.read_group(child)),
                "complexContent" | "simpleContent" => {
                    let derivation = child
                        .first_child(XSD_NS, "extension")
                        .or_else(|| child.first_child(XSD_NS, "restriction"));
                    if let Some(derivation) = derivation {
                        ty.base = derivation
                            .attribute("base")
                            .and_then(|base| derivation.resolve_qname(base));
                        for group in derivation.children() {
                            if group.is(XSD_NS, "sequence")
                                || group.is(XSD_NS, "choice")
                                || group.is(XSD_NS, "all")
                            {
                                ty.particles.push(self.read_group(group));
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        if ty.base.is_none() {
            ty.base = Some(any_type());
        }
        ty
    }

    fn read_group(&self, group: &XmlElement) -> XsdParticle {
        let mut particles = Vec::new();
        for child in group.children() {
            if child.name().namespace() != XSD_NS {
                continue;
            }
            match child.name().local_name() {
                "element" => particles.push(XsdParticle::Element(self.read_element(child))),
                "sequence" | "choice" | "all" => particles.push(self.read_group(child)),
                "any" => particles.push(XsdParticle::Wildcard),
                "annotation" => {}
                other => debug!(particle = other, "Skipping unsupported content particle"),
            }
        }
        XsdParticle::Group(particles)
    }

    fn read_element(&self, element: &XmlElement) -> XsdElement {
        let name = element.attribute("name").map(|n| self.qualify(n));

        let mut reference = None;
        let type_ref = if let Some(raw) = element.attribute("ref") {
            match element.resolve_qname(raw) {
                Some(target) => {
                    reference = Some(target);
                    XsdTypeRef::Missing
                }
                None => XsdTypeRef::Unresolvable(raw.to_string()),
            }
        } else if let Some(raw) = element.attribute("type") {
            element
                .resolve_qname(raw)
                .map_or_else(|| XsdTypeRef::Unresolvable(raw.to_string()), XsdTypeRef::Named)
        } else if let Some(inline) = element
            .first_child(XSD_NS, "complexType")
            .or_else(|| element.first_child(XSD_NS, "simpleType"))
        {
            XsdTypeRef::Anonymous(Box::new(self.read_type(inline, None)))
        } else {
            // An element without any type declaration is of type anyType.
            XsdTypeRef::Named(any_type())
        };

        XsdElement {
            name,
            reference,
            type_ref,
            min_occurs: parse_min_occurs(element.attribute("minOccurs")),
            max_occurs: parse_max_occurs(element.attribute("maxOccurs")),
            annotation: Self::read_annotation(element),
        }
    }
}

fn parse_min_occurs(value: Option<&str>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(1)
}

fn parse_max_occurs(value: Option<&str>) -> MaxOccurs {
    match value.map(str::trim) {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(v) => v.parse().map_or(MaxOccurs::Bounded(1), MaxOccurs::Bounded),
        None => MaxOccurs::Bounded(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            xmlns:tns="urn:test" targetNamespace="urn:test" elementFormDefault="qualified">"#;

    fn doc(body: &str) -> XsdDocument {
        XsdDocument::parse(&format!("{HEADER}{body}</xsd:schema>")).unwrap()
    }

    #[test]
    fn test_reads_target_namespace_and_types() {
        let document = doc(r#"
            <xsd:complexType name="UserType">
                <xsd:sequence>
                    <xsd:element name="uid" type="xsd:string"/>
                    <xsd:element name="mail" type="xsd:string" minOccurs="0" maxOccurs="unbounded"/>
                </xsd:sequence>
            </xsd:complexType>
            <xsd:simpleType name="Status">
                <xsd:restriction base="xsd:string"/>
            </xsd:simpleType>
            <xsd:element name="user" type="tns:UserType"/>"#);

        assert_eq!(document.target_namespace(), Some("urn:test"));
        assert_eq!(document.complex_types().len(), 1);
        assert_eq!(document.simple_types().len(), 1);
        assert_eq!(document.elements().len(), 1);

        let user_type = document.complex_type(&QName::new("urn:test", "UserType")).unwrap();
        assert_eq!(user_type.base(), Some(&any_type()));
        let XsdParticle::Group(members) = &user_type.particles()[0] else {
            panic!("expected a sequence group");
        };
        let XsdParticle::Element(mail) = &members[1] else {
            panic!("expected an element");
        };
        assert_eq!(mail.name(), Some(&QName::new("urn:test", "mail")));
        assert_eq!(mail.min_occurs(), 0);
        assert_eq!(mail.max_occurs(), MaxOccurs::Unbounded);
    }

    #[test]
    fn test_reads_extension_base() {
        let document = doc(r#"
            <xsd:complexType name="Base"><xsd:sequence/></xsd:complexType>
            <xsd:complexType name="Derived">
                <xsd:complexContent>
                    <xsd:extension base="tns:Base">
                        <xsd:sequence><xsd:element name="extra" type="xsd:int"/></xsd:sequence>
                    </xsd:extension>
                </xsd:complexContent>
            </xsd:complexType>"#);

        let derived = document.complex_type(&QName::new("urn:test", "Derived")).unwrap();
        assert_eq!(derived.base(), Some(&QName::new("urn:test", "Base")));
        assert_eq!(derived.particles().len(), 1);
    }

    #[test]
    fn test_element_type_references() {
        let document = doc(r#"
            <xsd:element name="named" type="tns:Thing"/>
            <xsd:element name="inline"><xsd:complexType><xsd:sequence><xsd:any/></xsd:sequence></xsd:complexType></xsd:element>
            <xsd:element name="bare"/>
            <xsd:element name="broken" type="nope:Thing"/>"#);

        let kinds: Vec<&XsdTypeRef> = document.elements().iter().map(XsdElement::type_ref).collect();
        assert!(matches!(kinds[0], XsdTypeRef::Named(q) if q.local_name() == "Thing"));
        assert!(matches!(kinds[1], XsdTypeRef::Anonymous(t) if t.base() == Some(&any_type())));
        assert!(matches!(kinds[2], XsdTypeRef::Named(q) if q == &any_type()));
        assert!(matches!(kinds[3], XsdTypeRef::Unresolvable(raw) if raw == "nope:Thing"));
    }

    #[test]
    fn test_missing_target_namespace_is_not_fatal_here() {
        let document = XsdDocument::parse(
            r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"/>"#,
        )
        .unwrap();
        assert_eq!(document.target_namespace(), None);
    }

    #[test]
    fn test_rejects_non_schema_root() {
        let err = XsdDocument::parse("<root/>").unwrap_err();
        assert!(matches!(err, SchemaError::NotASchema { .. }));
    }

    #[test]
    fn test_occurrence_defaults() {
        assert_eq!(parse_min_occurs(None), 1);
        assert_eq!(parse_min_occurs(Some("x")), 1);
        assert_eq!(parse_max_occurs(Some("5")), MaxOccurs::Bounded(5));
        assert_eq!(parse_max_occurs(None), MaxOccurs::Bounded(1));
    }
}
