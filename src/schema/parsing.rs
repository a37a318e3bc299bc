//! XSD document parsing
//!
//! This module reads a schema document into the [`Schema`] model. Only XSD
//! elements in the XML Schema namespace are recognized; anything else is
//! skipped.

use roxmltree::Node;

use super::builtins::XSD_NAMESPACE;
use super::model::{
    Annotation, ComplexType, Documentation, ElementDecl, InlineShape, RootElement, Schema,
    SequenceElement, TypeName, Wildcard,
};
use crate::error::SchemaError;
use crate::names::split_qname;

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SEQUENCE: &str = "sequence";
    pub const ALL: &str = "all";
    pub const ANY: &str = "any";
    pub const ANNOTATION: &str = "annotation";
    pub const DOCUMENTATION: &str = "documentation";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const DEFAULT: &str = "default";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const PROCESS_CONTENTS: &str = "processContents";
    pub const SOURCE: &str = "source";
}

/// Prefixes treated as the XML Schema namespace when left undeclared
const CONVENTIONAL_XSD_PREFIXES: &[&str] = &["xs", "xsd"];

impl Schema {
    /// Parse a schema from its text
    pub fn parse(xsd: &str) -> Result<Schema, SchemaError> {
        parse_schema(xsd)
    }
}

/// Parse a schema document
pub fn parse_schema(xsd: &str) -> Result<Schema, SchemaError> {
    let doc = roxmltree::Document::parse(xsd)?;
    let root = doc.root_element();
    if !is_xsd(&root, xsd_elements::SCHEMA) {
        return Err(SchemaError::NotASchema {
            found: root.tag_name().name().to_string(),
        });
    }

    let mut schema = Schema {
        target_namespace: root
            .attribute(xsd_attrs::TARGET_NAMESPACE)
            .map(str::to_string),
        ..Default::default()
    };

    for child in xsd_children(&root) {
        match child.tag_name().name() {
            xsd_elements::ELEMENT if schema.root_element.is_none() => {
                let name = child
                    .attribute(xsd_attrs::NAME)
                    .ok_or_else(|| SchemaError::MissingName {
                        kind: "top-level element",
                        context: "schema".to_string(),
                    })?;
                schema.root_element = Some(RootElement {
                    name: name.to_string(),
                    type_ref: type_attribute(&child),
                });
            }
            xsd_elements::COMPLEX_TYPE => {
                schema.complex_types.push(parse_complex_type(&child));
            }
            other => {
                tracing::debug!("skipping top-level schema component '{}'", other);
            }
        }
    }

    Ok(schema)
}

fn parse_complex_type(node: &Node) -> ComplexType {
    let mut complex_type = ComplexType {
        name: node.attribute(xsd_attrs::NAME).map(str::to_string),
        ..Default::default()
    };

    for child in xsd_children(node) {
        match child.tag_name().name() {
            xsd_elements::ANNOTATION => complex_type.annotation = parse_annotation(&child),
            xsd_elements::ALL | xsd_elements::SEQUENCE => {
                complex_type.elements.extend(
                    xsd_children(&child)
                        .filter(|n| n.tag_name().name() == xsd_elements::ELEMENT)
                        .map(|n| parse_element(&n)),
                );
            }
            _ => {}
        }
    }

    complex_type
}

fn parse_element(node: &Node) -> ElementDecl {
    let mut element = ElementDecl {
        name: node.attribute(xsd_attrs::NAME).map(str::to_string),
        type_ref: type_attribute(node),
        min_occurs: node.attribute(xsd_attrs::MIN_OCCURS).map(str::to_string),
        default: node.attribute(xsd_attrs::DEFAULT).map(str::to_string),
        ..Default::default()
    };

    for child in xsd_children(node) {
        match child.tag_name().name() {
            xsd_elements::ANNOTATION => element.annotation = parse_annotation(&child),
            xsd_elements::COMPLEX_TYPE => element.inline = Some(parse_inline_shape(&child)),
            _ => {}
        }
    }

    element
}

fn parse_inline_shape(node: &Node) -> InlineShape {
    let mut shape = InlineShape::default();

    for child in xsd_children(node) {
        match child.tag_name().name() {
            xsd_elements::ANNOTATION => {}
            xsd_elements::SEQUENCE => {
                for particle in xsd_children(&child) {
                    match particle.tag_name().name() {
                        xsd_elements::ELEMENT => shape.sequence.push(SequenceElement {
                            name: particle.attribute(xsd_attrs::NAME).map(str::to_string),
                            type_ref: type_attribute(&particle),
                            min_occurs: particle
                                .attribute(xsd_attrs::MIN_OCCURS)
                                .map(str::to_string),
                            max_occurs: particle
                                .attribute(xsd_attrs::MAX_OCCURS)
                                .map(str::to_string),
                            has_inline_type: xsd_children(&particle)
                                .any(|n| n.tag_name().name() == xsd_elements::COMPLEX_TYPE),
                        }),
                        xsd_elements::ANY => shape.wildcards.push(Wildcard {
                            min_occurs: particle
                                .attribute(xsd_attrs::MIN_OCCURS)
                                .map(str::to_string),
                            max_occurs: particle
                                .attribute(xsd_attrs::MAX_OCCURS)
                                .map(str::to_string),
                            process_contents: particle
                                .attribute(xsd_attrs::PROCESS_CONTENTS)
                                .map(str::to_string),
                        }),
                        xsd_elements::ANNOTATION => {}
                        other => shape.unsupported.push(other.to_string()),
                    }
                }
            }
            other => shape.unsupported.push(other.to_string()),
        }
    }

    shape
}

fn parse_annotation(node: &Node) -> Annotation {
    Annotation {
        documentation: xsd_children(node)
            .filter(|n| n.tag_name().name() == xsd_elements::DOCUMENTATION)
            .map(|n| Documentation {
                source: n.attribute(xsd_attrs::SOURCE).map(str::to_string),
                text: n
                    .descendants()
                    .filter(|d| d.is_text())
                    .filter_map(|d| d.text())
                    .collect(),
            })
            .collect(),
    }
}

/// Resolve the `type` attribute against the namespaces in scope
fn type_attribute(node: &Node) -> Option<TypeName> {
    let raw = node.attribute(xsd_attrs::TYPE)?.trim();
    if raw.is_empty() {
        return None;
    }
    let (prefix, local) = split_qname(raw);
    let is_builtin = match node.lookup_namespace_uri(prefix) {
        Some(uri) => uri == XSD_NAMESPACE,
        None => prefix.map_or(false, |p| CONVENTIONAL_XSD_PREFIXES.contains(&p)),
    };
    Some(if is_builtin {
        TypeName::Builtin(local.to_string())
    } else {
        TypeName::Named(local.to_string())
    })
}

fn is_xsd(node: &Node, local: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSD_NAMESPACE)
        && node.tag_name().name() == local
}

fn xsd_children<'a, 'input>(node: &Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(XSD_NAMESPACE))
}
