//! Schema compilation tests against a trimmed project-descriptor schema

use xsdbind::{
    compile_schema, generate_rust, parse_schema, CompilerConfig, FieldShape, SchemaError,
    ShapeKind, TypeCompiler, TypeRef,
};

const MINI_POM_XSD: &str = include_str!("fixtures/mini-pom.xsd");

#[test]
fn test_registry_order_and_wrapper_placement() {
    let schema = parse_schema(MINI_POM_XSD).unwrap();
    let registry = compile_schema(&schema).unwrap();

    assert_eq!(
        registry.names(),
        vec![
            "SequenceModule",
            "SequenceDependency",
            "SequenceRepository",
            "project",
            "Parent",
            "Dependency",
            "Repository",
            "RepositoryPolicy",
            "SequencePlugin",
            "Build",
            "Plugin",
        ]
    );
}

#[test]
fn test_root_type_renamed() {
    let registry = compile_schema(&parse_schema(MINI_POM_XSD).unwrap()).unwrap();
    let root = registry.root().unwrap();

    assert_eq!(root.name, "project");
    assert_eq!(root.schema_name.as_deref(), Some("Model"));
    assert_eq!(
        root.documentation.as_deref(),
        Some("The root of a project descriptor.")
    );
    assert!(registry.get("Model").is_none());
}

#[test]
fn test_root_field_shapes() {
    let registry = compile_schema(&parse_schema(MINI_POM_XSD).unwrap()).unwrap();
    let root = registry.root().unwrap();

    let shapes: Vec<(&str, ShapeKind)> = root
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.kind()))
        .collect();
    assert_eq!(
        shapes,
        vec![
            ("ModelVersion", ShapeKind::OptionalScalar),
            ("Parent", ShapeKind::OptionalScalar),
            ("GroupID", ShapeKind::OptionalScalar),
            ("ArtifactID", ShapeKind::OptionalScalar),
            ("Version", ShapeKind::OptionalScalar),
            ("Packaging", ShapeKind::OptionalScalar),
            ("URL", ShapeKind::OptionalScalar),
            ("Modules", ShapeKind::ListWrapperReference),
            ("Properties", ShapeKind::OrderedBagReference),
            ("Dependencies", ShapeKind::ListWrapperReference),
            ("Repositories", ShapeKind::ListWrapperReference),
            ("Build", ShapeKind::OptionalScalar),
            ("Comment", ShapeKind::Comment),
        ]
    );

    let model_version = root.field("modelVersion").unwrap();
    assert_eq!(
        model_version.documentation.as_deref(),
        Some("Declares the descriptor version.")
    );
    assert_eq!(root.field("packaging").unwrap().default.as_deref(), Some("jar"));
    assert_eq!(
        root.field("parent").unwrap().target(),
        Some(&TypeRef::Complex("Parent".to_string()))
    );
}

#[test]
fn test_wrapper_shared_between_owners() {
    let registry = compile_schema(&parse_schema(MINI_POM_XSD).unwrap()).unwrap();

    let from_root = registry.root().unwrap().field("dependencies").unwrap();
    let from_plugin = registry.get("Plugin").unwrap().field("dependencies").unwrap();
    assert_eq!(from_root.wrapper(), Some("SequenceDependency"));
    assert_eq!(from_plugin.wrapper(), Some("SequenceDependency"));

    let wrappers = registry.iter().filter(|t| t.is_list_wrapper()).count();
    assert_eq!(wrappers, 4);

    let wrapper = registry.get("SequenceDependency").unwrap();
    assert!(wrapper.fields[0].is_comment());
    assert_eq!(
        wrapper.fields[1].shape,
        FieldShape::List {
            item: TypeRef::Complex("Dependency".to_string())
        }
    );
}

#[test]
fn test_opaque_configuration() {
    let registry = compile_schema(&parse_schema(MINI_POM_XSD).unwrap()).unwrap();
    let plugin = registry.get("Plugin").unwrap();
    assert_eq!(
        plugin.field("configuration").unwrap().kind(),
        ShapeKind::OpaqueReference
    );
}

#[test]
fn test_property_bag_names_configurable() {
    let schema = parse_schema(MINI_POM_XSD).unwrap();
    let config = CompilerConfig::new().with_property_bag_elements(["configuration"]);
    let registry = TypeCompiler::new(config).compile(&schema).unwrap();

    assert_eq!(
        registry.root().unwrap().field("properties").unwrap().kind(),
        ShapeKind::OpaqueReference
    );
    assert_eq!(
        registry.get("Plugin").unwrap().field("configuration").unwrap().kind(),
        ShapeKind::OrderedBagReference
    );
}

#[test]
fn test_compilation_is_deterministic() {
    let schema = parse_schema(MINI_POM_XSD).unwrap();
    let first = compile_schema(&schema).unwrap().to_json().unwrap();
    let second = compile_schema(&schema).unwrap().to_json().unwrap();
    assert_eq!(first, second);
    assert!(first.contains("\"schema_name\": \"Model\""));
}

#[test]
fn test_ambiguous_list_and_type() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Widget">
    <xs:all>
      <xs:element name="tags" type="xs:string">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="tag" maxOccurs="unbounded" type="xs:string"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:all>
  </xs:complexType>
</xs:schema>"#;
    let err = compile_schema(&parse_schema(xsd).unwrap()).unwrap_err();
    assert!(matches!(err, SchemaError::AmbiguousElement { ref element, .. } if element == "tags"));
}

#[test]
fn test_list_and_wildcard_is_ambiguous() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Widget">
    <xs:all>
      <xs:element name="tags">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="tag" maxOccurs="unbounded" type="xs:string"/>
            <xs:any maxOccurs="unbounded" processContents="skip"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:all>
  </xs:complexType>
</xs:schema>"#;
    let err = compile_schema(&parse_schema(xsd).unwrap()).unwrap_err();
    assert!(matches!(err, SchemaError::AmbiguousElement { .. }));
}

#[test]
fn test_bare_element_does_not_fail() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Widget">
    <xs:all>
      <xs:element name="name" type="xs:string"/>
      <xs:element/>
    </xs:all>
  </xs:complexType>
</xs:schema>"#;
    let registry = compile_schema(&parse_schema(xsd).unwrap()).unwrap();
    let widget = registry.get("Widget").unwrap();
    assert_eq!(widget.field_names(), vec!["Name", "", "Comment"]);
    assert_eq!(widget.fields[1].kind(), ShapeKind::Untyped);
}

#[test]
fn test_nameless_typed_element() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Widget">
    <xs:all>
      <xs:element type="xs:string"/>
    </xs:all>
  </xs:complexType>
</xs:schema>"#;
    let err = compile_schema(&parse_schema(xsd).unwrap()).unwrap_err();
    assert!(matches!(err, SchemaError::MissingName { kind: "element", .. }));
}

#[test]
fn test_unsupported_primitive() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Widget">
    <xs:all>
      <xs:element name="blob" type="xs:anyType"/>
    </xs:all>
  </xs:complexType>
</xs:schema>"#;
    let err = compile_schema(&parse_schema(xsd).unwrap()).unwrap_err();
    assert!(matches!(err, SchemaError::UnsupportedPrimitive { ref name } if name == "anyType"));
}

#[test]
fn test_generated_declarations() {
    let registry = compile_schema(&parse_schema(MINI_POM_XSD).unwrap()).unwrap();
    let code = generate_rust(&registry);

    assert!(code.contains("pub struct Project {"));
    assert!(code.contains("pub struct SequenceDependency {"));
    assert!(code.contains("    pub dependency: Vec<Dependency>,\n"));
    assert!(code.contains("    pub parent: Option<Parent>,\n"));
    assert!(code.contains("    pub optional: Option<bool>,\n"));
    assert!(code.contains("    pub url: Option<String>,\n"));
    assert_eq!(code.matches("pub struct SequenceDependency {").count(), 1);
}
