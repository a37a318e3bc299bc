//! Field shape classification
//!
//! [`FieldMapper`] looks at one child element of a complex type and decides
//! which of the field shapes it compiles to. Wrapper types synthesized for
//! list shapes are recorded in a [`CompileScope`], which belongs to a single
//! compilation run.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::config::CompilerConfig;
use super::descriptors::{FieldDescriptor, FieldShape, TypeDescriptor, TypeOrigin, TypeRef};
use crate::error::SchemaError;
use crate::names::{capitalize, display_name, is_valid_ncname};
use crate::schema::{normalize_primitive, ElementDecl, InlineShape, TypeName};

/// Per-run compilation state: declared names, the root rename, and the
/// wrappers synthesized so far
#[derive(Debug, Default)]
pub struct CompileScope {
    declared: HashSet<String>,
    rename: Option<(String, String)>,
    wrappers: IndexMap<String, TypeDescriptor>,
    pending: Vec<String>,
}

impl CompileScope {
    /// Create a scope for one run
    pub fn new(declared: HashSet<String>, rename: Option<(String, String)>) -> Self {
        Self {
            declared,
            rename,
            ..Default::default()
        }
    }

    /// Registry name of a declared type, after the root rename
    pub fn registry_name<'a>(&'a self, schema_name: &'a str) -> &'a str {
        match &self.rename {
            Some((from, to)) if from == schema_name => to,
            _ => schema_name,
        }
    }

    /// Resolve a schema type reference
    pub fn resolve(
        &self,
        type_name: &TypeName,
        owner: &str,
        element: &str,
    ) -> Result<TypeRef, SchemaError> {
        match type_name {
            TypeName::Builtin(local) => Ok(TypeRef::Primitive(normalize_primitive(local)?)),
            TypeName::Named(local) if self.declared.contains(local) => {
                Ok(TypeRef::Complex(self.registry_name(local).to_string()))
            }
            TypeName::Named(local) => Err(SchemaError::UnresolvedType {
                type_name: local.clone(),
                owner: owner.to_string(),
                element: element.to_string(),
            }),
        }
    }

    /// Register a wrapper, or reuse the one already synthesized under `name`
    fn synthesize_wrapper(&mut self, wrapper: TypeDescriptor, item: &TypeRef) -> Result<(), SchemaError> {
        if let Some(existing) = self.wrappers.get(&wrapper.name) {
            let existing_item = existing
                .data_fields()
                .find_map(|f| f.target())
                .cloned();
            return match existing_item {
                Some(ref found) if found == item => {
                    tracing::debug!("reusing list wrapper '{}'", wrapper.name);
                    Ok(())
                }
                other => Err(SchemaError::ConflictingWrapper {
                    name: wrapper.name,
                    first: other.map(|t| t.display()).unwrap_or_default(),
                    second: item.display(),
                }),
            };
        }

        let collides = self.declared.contains(&wrapper.name)
            || self.rename.as_ref().map_or(false, |(_, to)| *to == wrapper.name);
        if collides {
            return Err(SchemaError::NameCollision { name: wrapper.name });
        }

        self.pending.push(wrapper.name.clone());
        self.wrappers.insert(wrapper.name.clone(), wrapper);
        Ok(())
    }

    /// Wrappers synthesized since the last call, in creation order
    pub fn take_pending(&mut self) -> Vec<TypeDescriptor> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .filter_map(|name| self.wrappers.get(&name).cloned())
            .collect()
    }
}

/// Classifies schema elements into field descriptors
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper<'a> {
    config: &'a CompilerConfig,
}

impl<'a> FieldMapper<'a> {
    /// Create a mapper
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self { config }
    }

    /// Classify one child element of `owner`
    pub fn map(
        &self,
        owner: &str,
        element: &ElementDecl,
        scope: &mut CompileScope,
    ) -> Result<FieldDescriptor, SchemaError> {
        let inline = element.inline.as_ref().filter(|shape| !shape.is_empty());
        if element.type_ref.is_none() && inline.is_none() {
            return Ok(untyped(owner, element));
        }

        let wire = element
            .name
            .as_deref()
            .ok_or_else(|| SchemaError::MissingName {
                kind: "element",
                context: format!("type '{}'", owner),
            })?;
        if !is_valid_ncname(wire) {
            return Err(SchemaError::InvalidName {
                kind: "element",
                name: wire.to_string(),
            });
        }

        let shape = match (&element.type_ref, inline) {
            (Some(_), Some(shape)) => {
                let reason = if !shape.sequence.is_empty() {
                    "list shape and explicit type"
                } else if !shape.wildcards.is_empty() {
                    "open-content shape and explicit type"
                } else {
                    "inline type and explicit type"
                };
                return Err(SchemaError::AmbiguousElement {
                    type_name: owner.to_string(),
                    element: wire.to_string(),
                    reason,
                });
            }
            (None, Some(shape)) => self.map_inline(owner, wire, shape, scope)?,
            (Some(type_name), None) => {
                let target = scope.resolve(type_name, owner, wire)?;
                if self.config.optional_leaves() || element.is_optional() {
                    FieldShape::OptionalScalar { target }
                } else {
                    FieldShape::Scalar { target }
                }
            }
            (None, None) => return Ok(untyped(owner, element)),
        };

        let mut field = FieldDescriptor::new(display_name(wire, self.config.acronyms()), wire, shape);
        field.default = element.default.clone();
        field.documentation = element.annotation.description();
        Ok(field)
    }

    fn map_inline(
        &self,
        owner: &str,
        wire: &str,
        shape: &InlineShape,
        scope: &mut CompileScope,
    ) -> Result<FieldShape, SchemaError> {
        let unsupported = |reason: String| SchemaError::UnsupportedNesting {
            type_name: owner.to_string(),
            element: wire.to_string(),
            reason,
        };

        if !shape.unsupported.is_empty() {
            return Err(unsupported(format!(
                "unsupported particle(s): {}",
                shape.unsupported.join(", ")
            )));
        }
        if !shape.sequence.is_empty() && !shape.wildcards.is_empty() {
            return Err(SchemaError::AmbiguousElement {
                type_name: owner.to_string(),
                element: wire.to_string(),
                reason: "list shape and wildcard",
            });
        }

        if !shape.wildcards.is_empty() {
            return Ok(if self.config.is_property_bag(wire) {
                FieldShape::OrderedBagReference
            } else {
                FieldShape::OpaqueReference
            });
        }

        let [item] = shape.sequence.as_slice() else {
            return Err(unsupported(format!(
                "sequence of {} elements",
                shape.sequence.len()
            )));
        };
        let item_name = item.name.as_deref().ok_or_else(|| SchemaError::MissingName {
            kind: "sequence element",
            context: format!("'{}.{}'", owner, wire),
        })?;
        if !item.is_repeated() {
            return Err(unsupported(format!("'{}' is not repeated", item_name)));
        }
        let item_type = match (&item.type_ref, item.has_inline_type) {
            (Some(type_name), false) => scope.resolve(type_name, owner, item_name)?,
            (Some(_), true) => {
                return Err(SchemaError::AmbiguousElement {
                    type_name: owner.to_string(),
                    element: item_name.to_string(),
                    reason: "inline type and explicit type",
                })
            }
            (None, _) => {
                return Err(unsupported(format!(
                    "repeated element '{}' has no concrete type",
                    item_name
                )))
            }
        };

        let wrapper = self.wrapper_descriptor(item_name, &item_type);
        let wrapper_name = wrapper.name.clone();
        scope.synthesize_wrapper(wrapper, &item_type)?;
        Ok(FieldShape::ListWrapperReference {
            wrapper: wrapper_name,
        })
    }

    /// The two-field wrapper for a repeated element: comment, then the list
    fn wrapper_descriptor(&self, item_name: &str, item_type: &TypeRef) -> TypeDescriptor {
        let name = format!("{}{}", self.config.wrapper_prefix(), capitalize(item_name));
        TypeDescriptor {
            documentation: Some(format!(
                "{} holds the repeated `<{}>` elements of a list.",
                name, item_name
            )),
            name,
            schema_name: None,
            fields: vec![
                FieldDescriptor::comment(),
                FieldDescriptor::new(
                    display_name(item_name, self.config.acronyms()),
                    item_name,
                    FieldShape::List {
                        item: item_type.clone(),
                    },
                ),
            ],
            origin: TypeOrigin::ListWrapper,
        }
    }
}

/// An element with neither a type nor content binds to no value; it may
/// also lack a name
fn untyped(owner: &str, element: &ElementDecl) -> FieldDescriptor {
    let wire = element.name.as_deref().unwrap_or_default();
    tracing::warn!(
        "element '{}' in type '{}' has neither a type nor content; leaving it untyped",
        wire,
        owner
    );
    let mut field = FieldDescriptor::new("", wire, FieldShape::Untyped);
    field.documentation = element.annotation.description();
    field
}
