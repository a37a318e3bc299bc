//! Schema to type registry compilation

use std::collections::HashSet;

use indexmap::IndexMap;

use super::config::CompilerConfig;
use super::descriptors::{FieldDescriptor, TypeDescriptor, TypeOrigin, TypeRegistry};
use super::fields::{CompileScope, FieldMapper};
use crate::error::SchemaError;
use crate::names::is_valid_ncname;
use crate::schema::Schema;

/// Compiles a [`Schema`] into a [`TypeRegistry`]
///
/// A compiler holds only configuration. Each call to [`compile`](Self::compile)
/// gets a fresh [`CompileScope`], so wrapper deduplication never leaks between
/// runs, and one compiler can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct TypeCompiler {
    config: CompilerConfig,
}

impl TypeCompiler {
    /// Create a compiler
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile every complex type of `schema`, in declaration order
    ///
    /// Wrapper types land just before the first type that needs them. The
    /// whole run fails on the first error; no partial registry is returned.
    pub fn compile(&self, schema: &Schema) -> Result<TypeRegistry, SchemaError> {
        let declared = declared_names(schema)?;
        let rename = self.root_rename(schema, &declared);
        let root = rename
            .as_ref()
            .map(|(_, to)| to.clone())
            .or_else(|| self.root_type(schema).filter(|t| declared.contains(*t)).map(str::to_string));

        let mut scope = CompileScope::new(declared, rename);
        let mapper = FieldMapper::new(&self.config);
        let mut types: IndexMap<String, TypeDescriptor> = IndexMap::new();

        for complex_type in &schema.complex_types {
            // names were checked by declared_names
            let Some(schema_name) = complex_type.name.as_deref() else {
                continue;
            };
            let name = scope.registry_name(schema_name).to_string();
            tracing::trace!("compiling type '{}' as '{}'", schema_name, name);

            let mut fields = complex_type
                .elements
                .iter()
                .map(|element| mapper.map(schema_name, element, &mut scope))
                .collect::<Result<Vec<FieldDescriptor>, SchemaError>>()?;
            fields.push(FieldDescriptor::comment());

            for wrapper in scope.take_pending() {
                types.insert(wrapper.name.clone(), wrapper);
            }

            let renamed = name != schema_name;
            let origin = if root.as_deref() == Some(name.as_str()) {
                TypeOrigin::Root
            } else {
                TypeOrigin::Declared
            };
            types.insert(
                name.clone(),
                TypeDescriptor {
                    name,
                    schema_name: renamed.then(|| schema_name.to_string()),
                    documentation: complex_type.annotation.description(),
                    fields,
                    origin,
                },
            );
        }

        Ok(TypeRegistry::from_parts(types, root))
    }

    fn root_type<'s>(&'s self, schema: &'s Schema) -> Option<&'s str> {
        self.config.root_type().or_else(|| schema.designated_root_type())
    }

    /// `(schema type, root tag)` when the root type must be renamed
    fn root_rename(&self, schema: &Schema, declared: &HashSet<String>) -> Option<(String, String)> {
        let root_type = self.root_type(schema)?;
        let root_tag = self
            .config
            .root_tag()
            .or_else(|| schema.root_element.as_ref().map(|e| e.name.as_str()))?;

        if !declared.contains(root_type) {
            tracing::warn!("root type '{}' is not declared in the schema", root_type);
            return None;
        }
        if root_type == root_tag {
            return None;
        }
        if declared.contains(root_tag) {
            tracing::warn!(
                "root tag '{}' is already a type name; keeping '{}' unrenamed",
                root_tag,
                root_type
            );
            return None;
        }
        Some((root_type.to_string(), root_tag.to_string()))
    }
}

/// Compile with the default configuration
pub fn compile_schema(schema: &Schema) -> Result<TypeRegistry, SchemaError> {
    TypeCompiler::default().compile(schema)
}

fn declared_names(schema: &Schema) -> Result<HashSet<String>, SchemaError> {
    let mut declared = HashSet::new();
    for (position, complex_type) in schema.complex_types.iter().enumerate() {
        let name = complex_type
            .name
            .as_deref()
            .ok_or_else(|| SchemaError::MissingName {
                kind: "complex type",
                context: format!("schema position {}", position),
            })?;
        if !is_valid_ncname(name) {
            return Err(SchemaError::InvalidName {
                kind: "complex type",
                name: name.to_string(),
            });
        }
        if !declared.insert(name.to_string()) {
            return Err(SchemaError::DuplicateType {
                name: name.to_string(),
            });
        }
    }
    Ok(declared)
}
