//! Schema builder
//!
//! Turns an [`XsdDocument`] into a [`Schema`] in two passes:
//!
//! 1. Every top-level complex type becomes a [`ComplexTypeDefinition`]. Types
//!    annotated as resource objects also get a paired
//!    [`ResourceObjectDefinition`] sharing the same complex type.
//! 2. Every top-level element becomes a property container (when its type is a
//!    container) or a property, reusing the complex types from the first pass.
//!
//! Construction fails only when the document has no target namespace or when
//! a top-level element refers to an undeclared type. Elements without any
//! type declaration are `xsd:anyType` properties. Other irregularities are
//! logged and skipped.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::annotation::{
    self, Annotation, ACCESS, ACCOUNT_TYPE, ATTRIBUTE_DISPLAY_NAME, DESCRIPTION_ATTRIBUTE,
    DISPLAY_NAME, HELP, IDENTIFIER, IGNORE, NAMING_ATTRIBUTE, NATIVE_ATTRIBUTE_NAME,
    NATIVE_OBJECT_CLASS, PROPERTY_CONTAINER, RESOURCE_OBJECT, SECONDARY_IDENTIFIER,
};
use crate::config::BuilderOptions;
use crate::definition::{
    Access, ComplexTypeDefinition, Definition, PropertyContainerDefinition, PropertyDefinition,
    ResourceObjectDefinition,
};
use crate::error::{SchemaError, SchemaResult};
use crate::qname::QName;
use crate::schema::Schema;
use crate::xsd::{any_type, XsdDocument, XsdElement, XsdParticle, XsdType, XsdTypeRef};

/// Builds schemas from XML Schema documents.
///
/// A builder holds only its options; every [`build`](Self::build) call is
/// independent.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    options: BuilderOptions,
}

impl SchemaBuilder {
    /// Create a builder with the given options.
    #[must_use]
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    /// Get the builder options.
    #[must_use]
    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Build a schema from a parsed document.
    #[instrument(skip(self, document), fields(namespace = ?document.target_namespace()))]
    pub fn build(&self, document: &XsdDocument) -> SchemaResult<Schema> {
        let namespace = document
            .target_namespace()
            .ok_or(SchemaError::MissingNamespace)?
            .to_string();

        let mut definitions = Vec::new();
        {
            let mut run = BuildRun {
                options: &self.options,
                document,
                namespace: &namespace,
                cache: HashMap::new(),
                in_progress: HashSet::new(),
            };
            run.complex_types(&mut definitions);
            run.top_level_elements(&mut definitions)?;
        }

        let schema = Schema::new(namespace, definitions)?;
        info!(
            namespace = %schema.namespace(),
            definitions = schema.len(),
            object_classes = schema.resource_object_definitions().count(),
            "Schema built"
        );
        Ok(schema)
    }
}

/// State of one build invocation.
struct BuildRun<'a> {
    options: &'a BuilderOptions,
    document: &'a XsdDocument,
    namespace: &'a str,
    /// Plain complex types already built, shared between containers.
    cache: HashMap<QName, Arc<ComplexTypeDefinition>>,
    /// Complex types currently being expanded.
    in_progress: HashSet<QName>,
}

impl<'a> BuildRun<'a> {
    fn complex_types(&mut self, definitions: &mut Vec<Definition>) {
        let document = self.document;
        for ty in document.complex_types() {
            let Some(name) = ty.name() else { continue };
            if !name.is_in(self.namespace) {
                continue;
            }

            let resource = self.options.resource_schema && is_resource_object(ty.annotation());
            let complex_type = self.complex_type(ty, name.clone(), resource);
            definitions.push(Definition::ComplexType(Arc::clone(&complex_type)));

            if resource {
                definitions.push(resource_object_definition(complex_type, ty.annotation()).into());
            }
        }
    }

    fn top_level_elements(&mut self, definitions: &mut Vec<Definition>) -> SchemaResult<()> {
        let document = self.document;
        for element in document.elements() {
            let Some(name) = element.name() else { continue };
            if !name.is_in(self.namespace) {
                continue;
            }
            if let Some(definition) = self.top_level_element(name, element, definitions)? {
                definitions.push(definition);
            }
        }
        Ok(())
    }

    fn top_level_element(
        &self,
        name: &QName,
        element: &XsdElement,
        definitions: &[Definition],
    ) -> SchemaResult<Option<Definition>> {
        let type_name = match element.type_ref() {
            XsdTypeRef::Named(type_name) => type_name,
            XsdTypeRef::Anonymous(_) => {
                debug!(element = %name, "Skipping top-level element with anonymous type");
                return Ok(None);
            }
            XsdTypeRef::Missing => {
                return Err(SchemaError::undetermined_type(
                    name.to_string(),
                    "top-level element declared as a reference",
                ));
            }
            XsdTypeRef::Unresolvable(raw) => {
                return Err(SchemaError::undetermined_type(
                    name.to_string(),
                    format!("type '{raw}' uses an undeclared namespace prefix"),
                ));
            }
        };

        let declared = self.document.find_type(type_name);
        if declared.is_none() && type_name.is_in(self.namespace) {
            return Err(SchemaError::undetermined_type(
                name.to_string(),
                format!("type {type_name} is not declared in the schema"),
            ));
        }

        let annotation =
            annotation::select_annotation(element.annotation(), declared.and_then(XsdType::annotation));

        let is_object = self.derives_from_object_type(type_name);
        if is_object || self.is_container_type(type_name) {
            let complex_type = definitions
                .iter()
                .filter_map(Definition::as_complex_type)
                .find(|ctd| ctd.name() == type_name)
                .cloned();
            let mut container = match complex_type {
                Some(ctd) => PropertyContainerDefinition::new(name.clone(), ctd),
                None => PropertyContainerDefinition::schemaless(name.clone(), Some(type_name.clone())),
            }
            .with_ignored(ignored(annotation, name));
            if is_object {
                container = container.as_object();
            }
            return Ok(Some(container.into()));
        }

        let property = property_definition(name.clone(), type_name.clone(), element, annotation, false);
        Ok(Some(property.into()))
    }

    fn complex_type(&mut self, ty: &'a XsdType, name: QName, resource: bool) -> Arc<ComplexTypeDefinition> {
        let cacheable = !resource && ty.name().is_some();
        if cacheable {
            if let Some(cached) = self.cache.get(&name) {
                return Arc::clone(cached);
            }
        }

        self.in_progress.insert(name.clone());
        let mut complex_type =
            ComplexTypeDefinition::new(name.clone()).with_ignored(ignored(ty.annotation(), &name));
        let mut bases = HashSet::new();
        self.collect_members(ty, &mut complex_type, resource, &mut bases);
        self.in_progress.remove(&name);

        let complex_type = Arc::new(complex_type);
        if cacheable {
            self.cache.insert(name, Arc::clone(&complex_type));
        }
        complex_type
    }

    /// Base type content first, then the type's own particles.
    fn collect_members(
        &mut self,
        ty: &'a XsdType,
        target: &mut ComplexTypeDefinition,
        resource: bool,
        bases: &mut HashSet<QName>,
    ) {
        let document = self.document;
        if let Some(base) = ty.base() {
            if let Some(base_type) = document.complex_type(base) {
                if bases.insert(base.clone()) {
                    self.collect_members(base_type, target, resource, bases);
                } else {
                    warn!(complex_type = %target.name(), base = %base, "Circular type derivation");
                }
            }
        }

        for particle in ty.particles() {
            self.collect_particle(particle, target, resource);
        }
    }

    fn collect_particle(
        &mut self,
        particle: &'a XsdParticle,
        target: &mut ComplexTypeDefinition,
        resource: bool,
    ) {
        match particle {
            XsdParticle::Group(particles) => {
                for nested in particles {
                    self.collect_particle(nested, target, resource);
                }
            }
            XsdParticle::Element(element) => {
                if let Some(definition) = self.member(element, resource) {
                    target.push(definition);
                }
            }
            XsdParticle::Wildcard => {
                debug!(complex_type = %target.name(), "Skipping xsd:any wildcard");
            }
        }
    }

    /// Classify one member element.
    fn member(&mut self, element: &'a XsdElement, resource: bool) -> Option<Definition> {
        let document = self.document;
        let (declaration, name) = match (element.reference(), element.name()) {
            (Some(reference), _) => match document.element(reference) {
                Some(target) => (target, reference.clone()),
                None => {
                    debug!(reference = %reference, "Skipping reference to an element outside the schema");
                    return None;
                }
            },
            (None, Some(name)) => (element, name.clone()),
            (None, None) => {
                if let XsdTypeRef::Unresolvable(raw) = element.type_ref() {
                    debug!(reference = %raw, "Skipping element reference with undeclared prefix");
                }
                return None;
            }
        };

        match declaration.type_ref() {
            XsdTypeRef::Named(type_name) => {
                let type_annotation = document.find_type(type_name).and_then(XsdType::annotation);
                let site_annotation = if std::ptr::eq(declaration, element) {
                    type_annotation
                } else {
                    declaration.annotation().or(type_annotation)
                };
                let annotation = annotation::select_annotation(element.annotation(), site_annotation);
                self.named_member(name, type_name, element, annotation, resource)
            }
            XsdTypeRef::Anonymous(ty) => {
                let annotation = annotation::select_annotation(element.annotation(), ty.annotation());
                self.anonymous_member(name, ty, annotation)
            }
            XsdTypeRef::Missing => {
                debug!(member = %name, "Skipping reference to another element reference");
                None
            }
            XsdTypeRef::Unresolvable(raw) => {
                debug!(member = %name, type_name = %raw, "Skipping member with unresolvable type");
                None
            }
        }
    }

    fn named_member(
        &mut self,
        name: QName,
        type_name: &QName,
        element: &XsdElement,
        annotation: Option<&Annotation>,
        resource: bool,
    ) -> Option<Definition> {
        if self.derives_from_object_type(type_name) {
            debug!(member = %name, type_name = %type_name, "Skipping object reference member");
            return None;
        }

        if self.is_container_type(type_name) {
            let ignored = ignored(annotation, &name);
            if self.in_progress.contains(type_name) {
                warn!(member = %name, type_name = %type_name, "Recursive container type, content left unexpanded");
                return Some(
                    PropertyContainerDefinition::schemaless(name, Some(type_name.clone()))
                        .with_ignored(ignored)
                        .into(),
                );
            }

            let document = self.document;
            let container = match document.complex_type(type_name) {
                Some(ty) => {
                    let inner = self.complex_type(ty, type_name.clone(), false);
                    PropertyContainerDefinition::new(name, inner)
                }
                None => PropertyContainerDefinition::schemaless(name, Some(type_name.clone())),
            };
            return Some(container.with_ignored(ignored).into());
        }

        Some(property_definition(name, type_name.clone(), element, annotation, resource).into())
    }

    fn anonymous_member(
        &mut self,
        name: QName,
        ty: &'a XsdType,
        annotation: Option<&Annotation>,
    ) -> Option<Definition> {
        if ty.is_simple() {
            debug!(member = %name, "Skipping member with anonymous simple type");
            return None;
        }

        let ignored = ignored(annotation, &name);
        let marked_container = ty.annotation().is_some_and(|a| a.has(PROPERTY_CONTAINER))
            || ty.base().is_some_and(|base| self.is_container_type(base));
        if marked_container {
            let inner = self.complex_type(ty, name.clone(), false);
            return Some(
                PropertyContainerDefinition::new(name, inner)
                    .with_ignored(ignored)
                    .into(),
            );
        }

        if self.ultimate_base(ty) == Some(any_type()) {
            return Some(
                PropertyContainerDefinition::schemaless(name, None)
                    .with_ignored(ignored)
                    .into(),
            );
        }

        debug!(member = %name, "Skipping member with anonymous type");
        None
    }

    /// Walk the derivation chain from `type_name` up to the last known type.
    fn base_chain(&self, type_name: &QName) -> Vec<QName> {
        let mut chain = vec![type_name.clone()];
        let mut current = self.document.find_type(type_name);
        while let Some(ty) = current {
            let Some(base) = ty.base() else { break };
            if chain.contains(base) {
                break;
            }
            chain.push(base.clone());
            current = self.document.find_type(base);
        }
        chain
    }

    fn ultimate_base(&self, ty: &XsdType) -> Option<QName> {
        ty.base().and_then(|base| self.base_chain(base).pop())
    }

    fn is_container_type(&self, type_name: &QName) -> bool {
        self.base_chain(type_name).iter().any(|name| {
            self.document
                .find_type(name)
                .and_then(XsdType::annotation)
                .is_some_and(|a| a.has(PROPERTY_CONTAINER))
        })
    }

    fn derives_from_object_type(&self, type_name: &QName) -> bool {
        self.base_chain(type_name).contains(&self.options.object_type)
    }
}

fn is_resource_object(annotation: Option<&Annotation>) -> bool {
    annotation.is_some_and(|a| a.has(RESOURCE_OBJECT) || a.has(ACCOUNT_TYPE))
}

/// `ignore` with empty content means `true`; otherwise the text is parsed
/// case-insensitively. Only the first `ignore` annotation counts.
fn ignored(annotation: Option<&Annotation>, subject: &QName) -> bool {
    let flags = annotation::find_all(annotation, IGNORE);
    if flags.len() > 1 {
        warn!(definition = %subject, count = flags.len(), "Multiple ignore annotations, using the first");
    }
    flags.first().is_some_and(|flag| {
        let text = flag.text();
        text.is_empty() || text.eq_ignore_ascii_case("true")
    })
}

/// All access when no `access` annotation is present; otherwise exactly the listed flags.
fn access(annotation: Option<&Annotation>, subject: &QName) -> Access {
    let entries = annotation::find_all(annotation, ACCESS);
    if entries.is_empty() {
        return Access::default();
    }

    let mut access = Access::none();
    for entry in entries {
        if !access.grant(entry.text()) {
            warn!(definition = %subject, value = entry.text(), "Unknown access value");
        }
    }
    access
}

fn property_definition(
    name: QName,
    type_name: QName,
    element: &XsdElement,
    annotation: Option<&Annotation>,
    resource: bool,
) -> PropertyDefinition {
    let access = access(annotation, &name);
    let ignored = ignored(annotation, &name);
    let mut property = PropertyDefinition::new(name, type_name)
        .with_occurs(element.min_occurs(), element.max_occurs())
        .with_access(access)
        .with_ignored(ignored);

    if let Some(display_name) = annotation::find_text(annotation, ATTRIBUTE_DISPLAY_NAME) {
        property = property.with_display_name(display_name);
    }
    if let Some(help) = annotation::find_text(annotation, HELP) {
        property = property.with_help(help);
    }
    if resource {
        let native = annotation::find_text(annotation, NATIVE_ATTRIBUTE_NAME).map(str::to_string);
        property = property.as_resource_attribute(native);
    }
    property
}

fn resource_object_definition(
    complex_type: Arc<ComplexTypeDefinition>,
    annotation: Option<&Annotation>,
) -> ResourceObjectDefinition {
    let ignored = ignored(annotation, complex_type.name());
    let mut definition = ResourceObjectDefinition::new(complex_type).with_ignored(ignored);

    if let Some(native) = annotation::find_text(annotation, NATIVE_OBJECT_CLASS) {
        definition = definition.with_native_object_class(native);
    }
    if let Some(account) = annotation::find_first(annotation, ACCOUNT_TYPE) {
        let default = account
            .attribute("default")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        definition = definition.with_account_type(true, default);
    }

    if let Some(name) = annotation::find_reference(annotation, DISPLAY_NAME) {
        definition = definition.with_display_name_attribute(name);
    }
    if let Some(name) = annotation::find_reference(annotation, NAMING_ATTRIBUTE) {
        definition = definition.with_naming_attribute(name);
    }
    if let Some(name) = annotation::find_reference(annotation, DESCRIPTION_ATTRIBUTE) {
        definition = definition.with_description_attribute(name);
    }

    for element in annotation::find_all(annotation, IDENTIFIER) {
        match annotation::reference_of(element) {
            Some(name) => definition = definition.with_identifier(name),
            None => warn!(object_class = %definition.name(), "Identifier annotation without a resolvable ref"),
        }
    }
    for element in annotation::find_all(annotation, SECONDARY_IDENTIFIER) {
        match annotation::reference_of(element) {
            Some(name) => definition = definition.with_secondary_identifier(name),
            None => warn!(object_class = %definition.name(), "Secondary identifier annotation without a resolvable ref"),
        }
    }

    definition
}
