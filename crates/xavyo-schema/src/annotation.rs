//! Annotation resolver
//!
//! Resource-semantic metadata is attached to type and element declarations
//! inside `xsd:annotation` blocks. Lookups here are pure: they never fail and
//! an absent annotation behaves like an empty one.
//!
//! ```xml
//! <xsd:complexType name="AccountObjectClass">
//!   <xsd:annotation>
//!     <xsd:appinfo>
//!       <ra:resourceObject/>
//!       <ra:identifier ref="tns:username"/>
//!     </xsd:appinfo>
//!   </xsd:annotation>
//!   ...
//! </xsd:complexType>
//! ```

use crate::qname::QName;
use crate::xsd::dom::XmlElement;
use crate::xsd::XSD_NS;

/// Namespace of the generic (non-resource) annotations.
pub const ANNOTATION_NS: &str = "urn:xavyo:schema:annotation";

/// Namespace of the resource-specific annotations.
pub const RESOURCE_ANNOTATION_NS: &str = "urn:xavyo:schema:resource-annotation";

/// Platform base namespace. Types from here are opaque to the builder.
pub const COMMON_NS: &str = "urn:xavyo:schema:common";

/// Local name of the platform's root object type.
pub const OBJECT_TYPE_LOCAL_NAME: &str = "ObjectType";

/// Name of a recognised annotation element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationName {
    namespace: &'static str,
    local_name: &'static str,
}

impl AnnotationName {
    const fn generic(local_name: &'static str) -> Self {
        Self {
            namespace: ANNOTATION_NS,
            local_name,
        }
    }

    const fn resource(local_name: &'static str) -> Self {
        Self {
            namespace: RESOURCE_ANNOTATION_NS,
            local_name,
        }
    }

    /// Namespace of the annotation element.
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Local name of the annotation element.
    #[must_use]
    pub fn local_name(&self) -> &'static str {
        self.local_name
    }

    /// The annotation name as a [`QName`].
    #[must_use]
    pub fn qname(&self) -> QName {
        QName::new(self.namespace, self.local_name)
    }
}

impl std::fmt::Display for AnnotationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local_name)
    }
}

/// Marks a type as a property container.
pub const PROPERTY_CONTAINER: AnnotationName = AnnotationName::generic("propertyContainer");
/// Hides a definition from higher layers (`true`, `false`, or empty for `true`).
pub const IGNORE: AnnotationName = AnnotationName::generic("ignore");
/// Allowed access (`create`, `read`, `update`); repeatable.
pub const ACCESS: AnnotationName = AnnotationName::generic("access");
/// Help text for a property.
pub const HELP: AnnotationName = AnnotationName::generic("help");

/// Marks a complex type as a resource object class.
pub const RESOURCE_OBJECT: AnnotationName = AnnotationName::resource("resourceObject");
/// Legacy account classification; implies `resourceObject`. Carries `default="true"`.
pub const ACCOUNT_TYPE: AnnotationName = AnnotationName::resource("accountType");
/// The resource's own name for an object class.
pub const NATIVE_OBJECT_CLASS: AnnotationName = AnnotationName::resource("nativeObjectClass");
/// The resource's own name for an attribute.
pub const NATIVE_ATTRIBUTE_NAME: AnnotationName = AnnotationName::resource("nativeAttributeName");
/// Human readable attribute name.
pub const ATTRIBUTE_DISPLAY_NAME: AnnotationName =
    AnnotationName::resource("attributeDisplayName");
/// Reference (`ref`) to the attribute used as display name of an object.
pub const DISPLAY_NAME: AnnotationName = AnnotationName::resource("displayName");
/// Reference (`ref`) to the naming attribute.
pub const NAMING_ATTRIBUTE: AnnotationName = AnnotationName::resource("namingAttribute");
/// Reference (`ref`) to the description attribute.
pub const DESCRIPTION_ATTRIBUTE: AnnotationName = AnnotationName::resource("descriptionAttribute");
/// Reference (`ref`) to a primary identifier; repeatable.
pub const IDENTIFIER: AnnotationName = AnnotationName::resource("identifier");
/// Reference (`ref`) to a secondary identifier; repeatable.
pub const SECONDARY_IDENTIFIER: AnnotationName = AnnotationName::resource("secondaryIdentifier");

/// An `xsd:annotation` block attached to a declaration.
#[derive(Debug, Clone)]
pub struct Annotation {
    element: XmlElement,
}

impl Annotation {
    /// Wrap an `xsd:annotation` element.
    #[must_use]
    pub fn new(element: XmlElement) -> Self {
        Self { element }
    }

    /// The underlying `xsd:annotation` element.
    #[must_use]
    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    /// All annotation elements with the given name, in document order.
    #[must_use]
    pub fn elements(&self, name: AnnotationName) -> Vec<&XmlElement> {
        self.element.descendants(name.namespace, name.local_name)
    }

    /// First annotation element with the given name.
    #[must_use]
    pub fn first(&self, name: AnnotationName) -> Option<&XmlElement> {
        self.elements(name).into_iter().next()
    }

    /// Check whether an annotation element with the given name is present.
    #[must_use]
    pub fn has(&self, name: AnnotationName) -> bool {
        self.first(name).is_some()
    }

    /// Whether this annotation carries nested `xsd:appinfo` content.
    #[must_use]
    pub fn has_appinfo(&self) -> bool {
        !self.element.descendants(XSD_NS, "appinfo").is_empty()
    }
}

/// All annotation elements with the given name; empty when the annotation is absent.
#[must_use]
pub fn find_all(annotation: Option<&Annotation>, name: AnnotationName) -> Vec<&XmlElement> {
    annotation.map(|a| a.elements(name)).unwrap_or_default()
}

/// First annotation element with the given name, if any.
#[must_use]
pub fn find_first(annotation: Option<&Annotation>, name: AnnotationName) -> Option<&XmlElement> {
    annotation.and_then(|a| a.first(name))
}

/// Trimmed, non-empty text of the first annotation element with the given name.
#[must_use]
pub fn find_text<'a>(annotation: Option<&'a Annotation>, name: AnnotationName) -> Option<&'a str> {
    find_first(annotation, name)
        .map(XmlElement::text)
        .filter(|text| !text.is_empty())
}

/// Resolve the `ref` attribute of the first annotation element with the given name.
#[must_use]
pub fn find_reference(annotation: Option<&Annotation>, name: AnnotationName) -> Option<QName> {
    find_first(annotation, name).and_then(reference_of)
}

/// Resolve the `ref` attribute of an annotation element against its namespace scope.
#[must_use]
pub fn reference_of(element: &XmlElement) -> Option<QName> {
    element
        .attribute("ref")
        .and_then(|value| element.resolve_qname(value))
}

/// Choose between an annotation at the occurrence site and one at the type site.
///
/// The occurrence-site annotation wins only when it carries `xsd:appinfo`
/// content; otherwise the type-site annotation is used under the same
/// condition. Returns `None` when neither qualifies.
#[must_use]
pub fn select_annotation<'a>(
    occurrence: Option<&'a Annotation>,
    type_site: Option<&'a Annotation>,
) -> Option<&'a Annotation> {
    occurrence
        .filter(|a| a.has_appinfo())
        .or_else(|| type_site.filter(|a| a.has_appinfo()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xsd::dom::parse_document;

    fn annotation(body: &str) -> Annotation {
        let xml = format!(
            r#"<xsd:annotation xmlns:xsd="{XSD_NS}" xmlns:a="{ANNOTATION_NS}"
                   xmlns:ra="{RESOURCE_ANNOTATION_NS}" xmlns:tns="urn:test">{body}</xsd:annotation>"#
        );
        Annotation::new(parse_document(&xml).unwrap())
    }

    #[test]
    fn test_absent_annotation_is_empty() {
        assert!(find_all(None, ACCESS).is_empty());
        assert!(find_first(None, IGNORE).is_none());
    }

    #[test]
    fn test_find_all_in_order() {
        let a = annotation(
            "<xsd:appinfo><a:access>read</a:access><a:access>update</a:access></xsd:appinfo>",
        );
        let values: Vec<&str> = find_all(Some(&a), ACCESS).iter().map(|e| e.text()).collect();
        assert_eq!(values, vec!["read", "update"]);
        assert!(find_first(Some(&a), HELP).is_none());
    }

    #[test]
    fn test_unknown_annotations_are_ignored() {
        let a = annotation(r#"<xsd:appinfo><x:other xmlns:x="urn:other"/></xsd:appinfo>"#);
        assert!(!a.has(IGNORE));
        assert!(!a.has(RESOURCE_OBJECT));
    }

    #[test]
    fn test_find_reference() {
        let a = annotation(r#"<xsd:appinfo><ra:identifier ref="tns:username"/></xsd:appinfo>"#);
        assert_eq!(
            find_reference(Some(&a), IDENTIFIER),
            Some(QName::new("urn:test", "username"))
        );
    }

    #[test]
    fn test_find_text_skips_empty() {
        let a = annotation("<xsd:appinfo><a:help>  </a:help></xsd:appinfo>");
        assert_eq!(find_text(Some(&a), HELP), None);
    }

    #[test]
    fn test_select_annotation_prefers_occurrence_with_appinfo() {
        let occurrence = annotation("<xsd:appinfo><a:help>site</a:help></xsd:appinfo>");
        let type_site = annotation("<xsd:appinfo><a:help>type</a:help></xsd:appinfo>");

        let chosen = select_annotation(Some(&occurrence), Some(&type_site)).unwrap();
        assert_eq!(find_text(Some(chosen), HELP), Some("site"));
    }

    #[test]
    fn test_select_annotation_falls_back_to_type_site() {
        let occurrence = annotation("<xsd:documentation>just prose</xsd:documentation>");
        let type_site = annotation("<xsd:appinfo><a:help>type</a:help></xsd:appinfo>");

        let chosen = select_annotation(Some(&occurrence), Some(&type_site)).unwrap();
        assert_eq!(find_text(Some(chosen), HELP), Some("type"));

        assert!(select_annotation(Some(&occurrence), None).is_none());
        assert!(select_annotation(None, None).is_none());
    }
}
