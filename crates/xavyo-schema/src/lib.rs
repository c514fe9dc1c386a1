//! # Resource Schema Introspection
//!
//! Builds a typed, queryable schema model from an annotated XML Schema that
//! describes the objects of an external identity resource.
//!
//! ## Example
//!
//! ```
//! let xsd = r#"
//! <xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
//!             xmlns:ra="urn:xavyo:schema:resource-annotation"
//!             xmlns:tns="urn:test" targetNamespace="urn:test">
//!   <xsd:complexType name="AccountObjectClass">
//!     <xsd:annotation><xsd:appinfo>
//!       <ra:resourceObject/>
//!       <ra:identifier ref="tns:username"/>
//!     </xsd:appinfo></xsd:annotation>
//!     <xsd:sequence>
//!       <xsd:element name="username" type="xsd:string"/>
//!     </xsd:sequence>
//!   </xsd:complexType>
//! </xsd:schema>"#;
//!
//! let schema = xavyo_schema::parse_schema(xsd).unwrap();
//! let account = schema.resource_object_definitions().next().unwrap();
//! assert_eq!(account.identifiers()[0].name().local_name(), "username");
//! ```
//!
//! ## Crate Organization
//!
//! - [`xsd`] - XML Schema reader
//! - [`annotation`] - Annotation names and lookups
//! - [`definition`] - Definition types
//! - [`schema`] - The [`Schema`] container
//! - [`builder`] - Two-pass [`SchemaBuilder`]
//! - [`config`] - [`BuilderOptions`]

pub mod annotation;
pub mod builder;
pub mod config;
pub mod definition;
pub mod error;
pub mod qname;
pub mod schema;
pub mod xsd;

pub use builder::SchemaBuilder;
pub use config::BuilderOptions;
pub use definition::{
    Access, ComplexTypeDefinition, ContainerKind, Definition, MaxOccurs,
    PropertyContainerDefinition, PropertyDefinition, PropertyKind, ResourceObjectDefinition,
};
pub use error::{SchemaError, SchemaResult};
pub use qname::QName;
pub use schema::Schema;
pub use xsd::XsdDocument;

/// Parse XML Schema text and build a resource schema with default options.
pub fn parse_schema(xml: &str) -> SchemaResult<Schema> {
    parse_schema_with(xml, BuilderOptions::default())
}

/// Parse XML Schema text and build a schema with the given options.
pub fn parse_schema_with(xml: &str, options: BuilderOptions) -> SchemaResult<Schema> {
    let document = XsdDocument::parse(xml)?;
    SchemaBuilder::new(options).build(&document)
}
