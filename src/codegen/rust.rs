//! Rust declaration generation

use std::collections::HashSet;

use crate::compiler::{FieldDescriptor, FieldShape, TypeDescriptor, TypeRef, TypeRegistry, COMMENT_KEY};
use crate::names::{rust_field_ident, rust_type_ident};

/// Generator for one `struct` per compiled type
///
/// The structs (de)serialize with wire names as keys, which is the shape
/// [`ModelCodec::decode_as`](crate::ModelCodec::decode_as) and
/// [`ModelCodec::encode_from`](crate::ModelCodec::encode_from) expect.
pub struct RustGenerator<'a> {
    registry: &'a TypeRegistry,
    crate_path: String,
}

impl<'a> RustGenerator<'a> {
    /// Creates a new generator.
    #[must_use]
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            crate_path: "xsdbind".to_string(),
        }
    }

    /// Sets the path the generated code uses to reach this crate's containers.
    #[must_use]
    pub fn with_crate_path(mut self, path: impl Into<String>) -> Self {
        self.crate_path = path.into();
        self
    }

    /// Generates all declarations in registry order.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        output.push_str("// Generated from an XML Schema. Do not edit.\n\n");
        output.push_str("use serde::{Deserialize, Serialize};\n\n");

        for desc in self.registry.iter() {
            output.push_str(&self.generate_struct(desc));
        }

        output
    }

    /// Generates the declaration of one type.
    #[must_use]
    pub fn generate_struct(&self, desc: &TypeDescriptor) -> String {
        let mut output = String::new();
        let rust_name = rust_type_ident(&desc.name);

        match &desc.documentation {
            Some(doc) => push_doc(&mut output, "", doc),
            None => output.push_str(&format!("/// {} element.\n", desc.name)),
        }
        output.push_str("#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]\n");
        output.push_str(&format!("pub struct {} {{\n", rust_name));

        let mut used = HashSet::new();
        let mut first = true;
        for field in &desc.fields {
            let Some(decl) = self.generate_field(desc, field, &mut used) else {
                continue;
            };
            if !first {
                output.push('\n');
            }
            output.push_str(&decl);
            first = false;
        }

        output.push_str("}\n\n");
        output
    }

    fn generate_field(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        used: &mut HashSet<String>,
    ) -> Option<String> {
        let (rust_type, skip) = match &field.shape {
            FieldShape::Comment => ("String".to_string(), "String::is_empty"),
            FieldShape::Untyped => return None,
            FieldShape::Scalar { target } => (self.target_type(owner, target, true), ""),
            FieldShape::OptionalScalar { target } => (
                format!("Option<{}>", self.target_type(owner, target, true)),
                "Option::is_none",
            ),
            FieldShape::ListWrapperReference { wrapper } => {
                (format!("Option<{}>", rust_type_ident(wrapper)), "Option::is_none")
            }
            FieldShape::OrderedBagReference => (
                format!("Option<{}::Properties>", self.crate_path),
                "Option::is_none",
            ),
            FieldShape::OpaqueReference => (
                format!("Option<{}::InnerXml>", self.crate_path),
                "Option::is_none",
            ),
            FieldShape::List { item } => (
                format!("Vec<{}>", self.target_type(owner, item, false)),
                "Vec::is_empty",
            ),
        };

        let mut ident = if field.is_comment() {
            "comment".to_string()
        } else {
            rust_field_ident(&field.name)
        };
        while !used.insert(ident.clone()) {
            ident.push('_');
        }

        let mut output = String::new();
        if let Some(doc) = &field.documentation {
            push_doc(&mut output, "    ", doc);
        }
        if let Some(default) = &field.default {
            if field.documentation.is_some() {
                output.push_str("    ///\n");
            }
            output.push_str(&format!("    /// Default: `{}`.\n", default));
        }

        let wire = if field.is_comment() {
            COMMENT_KEY
        } else {
            field.wire_name.as_str()
        };
        if skip.is_empty() {
            output.push_str(&format!("    #[serde(rename = \"{}\")]\n", wire));
        } else {
            output.push_str(&format!(
                "    #[serde(rename = \"{}\", default, skip_serializing_if = \"{}\")]\n",
                wire, skip
            ));
        }
        output.push_str(&format!("    pub {}: {},\n", ident, rust_type));
        Some(output)
    }

    /// Rust type for a field target; references that lead back to the owner
    /// are boxed
    fn target_type(&self, owner: &TypeDescriptor, target: &TypeRef, boxed: bool) -> String {
        match target {
            TypeRef::Primitive(kind) => kind.rust_type().to_string(),
            TypeRef::Complex(name) if boxed && self.reaches(name, &owner.name) => {
                format!("Box<{}>", rust_type_ident(name))
            }
            TypeRef::Complex(name) => rust_type_ident(name),
        }
    }

    /// Whether `from` holds `to` by value, directly or through other types
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from.to_string()];
        while let Some(name) = stack.pop() {
            if name == to {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(desc) = self.registry.get(&name) {
                stack.extend(desc.fields.iter().filter_map(held_by_value).map(str::to_string));
            }
        }
        false
    }
}

/// Type a field stores inline; `Vec` items live on the heap and do not count
fn held_by_value(field: &FieldDescriptor) -> Option<&str> {
    match &field.shape {
        FieldShape::Scalar {
            target: TypeRef::Complex(name),
        }
        | FieldShape::OptionalScalar {
            target: TypeRef::Complex(name),
        } => Some(name.as_str()),
        FieldShape::ListWrapperReference { wrapper } => Some(wrapper.as_str()),
        _ => None,
    }
}

fn push_doc(output: &mut String, indent: &str, doc: &str) {
    for line in doc.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            output.push_str(&format!("{}///\n", indent));
        } else {
            output.push_str(&format!("{}/// {}\n", indent, line.trim_start()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;
    use crate::schema::{Annotation, ComplexType, ElementDecl, Schema, TypeName};

    fn registry() -> TypeRegistry {
        let schema = Schema::new()
            .with_root("project", "Model")
            .with_type(
                ComplexType::new("Model")
                    .with_annotation(Annotation::from_texts(["3.0.0+", "The root element."]))
                    .with_element(
                        ElementDecl::typed("groupId", TypeName::builtin("string"))
                            .with_annotation(Annotation::from_texts(["4.0.0+", "The group."])),
                    )
                    .with_element(
                        ElementDecl::typed("packaging", TypeName::builtin("string"))
                            .with_default("jar"),
                    )
                    .with_element(ElementDecl::typed("type", TypeName::builtin("boolean")))
                    .with_element(ElementDecl::typed("parent", TypeName::named("Model")))
                    .with_element(ElementDecl::list(
                        "modules",
                        "module",
                        TypeName::builtin("string"),
                    ))
                    .with_element(ElementDecl::wildcard("properties"))
                    .with_element(ElementDecl::wildcard("configuration")),
            );
        compile_schema(&schema).unwrap()
    }

    #[test]
    fn test_generate_root_struct() {
        let registry = registry();
        let code = RustGenerator::new(&registry).generate();

        assert!(code.starts_with("// Generated from an XML Schema. Do not edit.\n"));
        assert!(code.contains("/// The root element.\n#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]\npub struct Project {\n"));
        assert!(code.contains(
            "    /// The group.\n    #[serde(rename = \"groupId\", default, skip_serializing_if = \"Option::is_none\")]\n    pub group_id: Option<String>,\n"
        ));
        assert!(code.contains("    /// Default: `jar`.\n"));
        assert!(code.contains("    pub r#type: Option<bool>,\n"));
        assert!(code.contains("    pub parent: Option<Box<Project>>,\n"));
        assert!(code.contains("    pub modules: Option<SequenceModule>,\n"));
        assert!(code.contains("    pub properties: Option<xsdbind::Properties>,\n"));
        assert!(code.contains("    pub configuration: Option<xsdbind::InnerXml>,\n"));
        assert!(code.contains(
            "    #[serde(rename = \"#comment\", default, skip_serializing_if = \"String::is_empty\")]\n    pub comment: String,\n"
        ));
    }

    #[test]
    fn test_generate_wrapper_before_owner() {
        let registry = registry();
        let code = RustGenerator::new(&registry).generate();

        let wrapper = code.find("pub struct SequenceModule {").unwrap();
        let owner = code.find("pub struct Project {").unwrap();
        assert!(wrapper < owner);
        assert!(code.contains("    pub module: Vec<String>,\n"));
    }

    #[test]
    fn test_crate_path() {
        let registry = registry();
        let code = RustGenerator::new(&registry)
            .with_crate_path("crate::bind")
            .generate();
        assert!(code.contains("Option<crate::bind::Properties>"));
    }

    #[test]
    fn test_comment_ident_collision() {
        let registry = compile_schema(&Schema::new().with_type(
            ComplexType::new("Note").with_element(ElementDecl::typed("comment", TypeName::builtin("string"))),
        ))
        .unwrap();
        let code = RustGenerator::new(&registry).generate();
        assert!(code.contains("    pub comment: Option<String>,\n"));
        assert!(code.contains("    pub comment_: String,\n"));
    }

    #[test]
    fn test_mutual_recursion_boxed() {
        let registry = compile_schema(
            &Schema::new()
                .with_type(ComplexType::new("A").with_element(ElementDecl::typed("b", TypeName::named("B"))))
                .with_type(ComplexType::new("B").with_element(ElementDecl::typed("a", TypeName::named("A"))))
                .with_type(ComplexType::new("C").with_element(ElementDecl::typed("a", TypeName::named("A")))),
        )
        .unwrap();
        let code = RustGenerator::new(&registry).generate();

        assert!(code.contains("    pub b: Option<Box<B>>,\n"));
        assert!(code.contains("    pub a: Option<Box<A>>,\n"));
        assert!(code.contains("    pub a: Option<A>,\n"));
    }
}
