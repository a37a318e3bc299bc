//! Top-level document codec
//!
//! [`ModelCodec`] applies the compiled type registry to whole documents:
//! `decode` turns XML bytes into a [`Record`] tree, `encode` writes a record
//! tree back out in descriptor order, with the document profile's header and
//! fixed root attributes.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::inner::InnerXml;
use super::json;
use super::properties::Properties;
use super::values::{Record, Value};
use crate::compiler::{FieldDescriptor, FieldShape, ShapeKind, TypeDescriptor, TypeRef, TypeRegistry};
use crate::documents::{Document, Element, Node, XmlWriter};
use crate::error::{DecodeError, EncodeError, Error, Result};
use crate::limits::Limits;
use crate::schema::PrimitiveKind;

/// Default XML declaration written before the root element
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Document-level output settings applied outside the per-field rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentProfile {
    declaration: Option<String>,
    root_attributes: Vec<(String, String)>,
    indent: Option<usize>,
}

impl Default for DocumentProfile {
    fn default() -> Self {
        Self {
            declaration: Some(XML_DECLARATION.to_string()),
            root_attributes: Vec::new(),
            indent: Some(2),
        }
    }
}

impl DocumentProfile {
    /// Create a profile with the XML declaration, two-space indent and no
    /// root attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile for Maven project descriptors
    pub fn pom() -> Self {
        Self::new()
            .with_root_attribute("xmlns", "http://maven.apache.org/POM/4.0.0")
            .with_root_attribute("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")
            .with_root_attribute(
                "xsi:schemaLocation",
                "http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd",
            )
    }

    /// Get the XML declaration
    pub fn declaration(&self) -> Option<&str> {
        self.declaration.as_deref()
    }

    /// Get the fixed root attributes
    pub fn root_attributes(&self) -> &[(String, String)] {
        &self.root_attributes
    }

    /// Get the indentation width
    pub fn indent(&self) -> Option<usize> {
        self.indent
    }

    /// Set the XML declaration; `None` writes none
    pub fn with_declaration(mut self, declaration: Option<String>) -> Self {
        self.declaration = declaration;
        self
    }

    /// Add a fixed root attribute
    pub fn with_root_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.root_attributes.push((name.into(), value.into()));
        self
    }

    /// Set the indentation width; `None` writes compact output
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }
}

/// Encoder and decoder for documents rooted at one compiled type
///
/// The registry is shared, so cloning a codec or building several codecs over
/// one registry is cheap.
#[derive(Debug, Clone)]
pub struct ModelCodec {
    registry: Arc<TypeRegistry>,
    root: String,
    profile: DocumentProfile,
    limits: Limits,
}

impl ModelCodec {
    /// Codec for the registry's root type
    pub fn new(registry: Arc<TypeRegistry>) -> Result<Self> {
        let root = registry
            .root()
            .map(|t| t.name.clone())
            .ok_or_else(|| Error::Config("registry has no root type".to_string()))?;
        Ok(Self::with_root(registry, root))
    }

    /// Codec for documents whose root element is the named type
    pub fn for_type(registry: Arc<TypeRegistry>, type_name: &str) -> Result<Self> {
        if !registry.contains(type_name) {
            return Err(DecodeError::UnknownType(type_name.to_string()).into());
        }
        Ok(Self::with_root(registry, type_name.to_string()))
    }

    fn with_root(registry: Arc<TypeRegistry>, root: String) -> Self {
        Self {
            registry,
            root,
            profile: DocumentProfile::default(),
            limits: Limits::default(),
        }
    }

    /// Set the document profile
    pub fn with_profile(mut self, profile: DocumentProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the decode limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the registry
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Get the root type name, which is also the root tag
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Get the document profile
    pub fn profile(&self) -> &DocumentProfile {
        &self.profile
    }

    fn root_descriptor(&self) -> Option<&TypeDescriptor> {
        self.registry.get(&self.root)
    }

    /// Decode a document
    pub fn decode(&self, xml: &[u8]) -> std::result::Result<Record, DecodeError> {
        let doc = Document::parse_with_limits(xml, &self.limits)?;
        let root = doc.root.ok_or(DecodeError::EmptyDocument)?;
        let desc = self
            .root_descriptor()
            .ok_or_else(|| DecodeError::UnknownType(self.root.clone()))?;

        if root.local_name() != desc.name {
            return Err(DecodeError::UnexpectedRoot {
                expected: desc.name.clone(),
                found: root.name,
            });
        }
        if !doc.prolog_comments.is_empty() {
            tracing::debug!(
                "dropping {} comment(s) before the root element",
                doc.prolog_comments.len()
            );
        }

        self.decode_record(desc, &root)
    }

    /// Decode a document held in a string
    pub fn decode_str(&self, xml: &str) -> std::result::Result<Record, DecodeError> {
        self.decode(xml.as_bytes())
    }

    /// Decode straight into a typed value keyed by wire names
    pub fn decode_as<T: DeserializeOwned>(&self, xml: &[u8]) -> std::result::Result<T, DecodeError> {
        let record = self.decode(xml)?;
        let tree = json::record_to_json(&record)?;
        Ok(serde_json::from_value(tree)?)
    }

    fn decode_record(
        &self,
        desc: &TypeDescriptor,
        element: &Element,
    ) -> std::result::Result<Record, DecodeError> {
        let mut record = Record::new(desc.name.clone());
        for field in &desc.fields {
            if let FieldShape::List { .. } = field.shape {
                record.set(field.wire_name.clone(), Value::List(Vec::new()));
            }
        }

        for node in &element.children {
            match node {
                Node::Element(child) => self.decode_child(desc, &mut record, child)?,
                Node::Comment(body) => record.push_comment(body),
                Node::Text(_) => {}
            }
        }

        let missing = desc
            .data_fields()
            .find(|f| matches!(f.shape, FieldShape::Scalar { .. }) && record.get(&f.wire_name).is_none());
        if let Some(field) = missing {
            return Err(DecodeError::MissingField {
                type_name: desc.name.clone(),
                field: field.wire_name.clone(),
            });
        }
        Ok(record)
    }

    fn decode_child(
        &self,
        desc: &TypeDescriptor,
        record: &mut Record,
        child: &Element,
    ) -> std::result::Result<(), DecodeError> {
        let Some(field) = desc.field(child.local_name()) else {
            tracing::debug!("ignoring unknown element '{}' in '{}'", child.name, desc.name);
            return Ok(());
        };
        let wire = field.wire_name.as_str();

        match &field.shape {
            FieldShape::Scalar { target } | FieldShape::OptionalScalar { target } => {
                let value = self.decode_value(field, target, child)?;
                record.set(wire, value);
            }
            FieldShape::ListWrapperReference { wrapper } => {
                let wrapper = self
                    .registry
                    .get(wrapper)
                    .ok_or_else(|| DecodeError::UnknownType(wrapper.clone()))?;
                let value = self.decode_record(wrapper, child)?;
                record.set(wire, value);
            }
            FieldShape::OrderedBagReference => {
                let bag = Properties::from_element(child);
                if bag.is_empty() {
                    record.remove(wire);
                } else {
                    record.set(wire, bag);
                }
            }
            FieldShape::OpaqueReference => {
                let inner = InnerXml::from_element(child);
                if inner.is_empty() {
                    record.remove(wire);
                } else {
                    record.set(wire, inner);
                }
            }
            FieldShape::List { item } => {
                let value = self.decode_value(field, item, child)?;
                match record.get_mut(wire) {
                    Some(Value::List(items)) => items.push(value),
                    _ => record.set(wire, Value::List(vec![value])),
                }
            }
            FieldShape::Comment | FieldShape::Untyped => {
                tracing::debug!("ignoring element '{}' bound to no value", child.name);
            }
        }
        Ok(())
    }

    fn decode_value(
        &self,
        field: &FieldDescriptor,
        target: &TypeRef,
        element: &Element,
    ) -> std::result::Result<Value, DecodeError> {
        match target {
            TypeRef::Primitive(kind) => parse_primitive(&field.wire_name, *kind, &element.text()),
            TypeRef::Complex(name) => {
                let desc = self
                    .registry
                    .get(name)
                    .ok_or_else(|| DecodeError::UnknownType(name.clone()))?;
                Ok(Value::Record(self.decode_record(desc, element)?))
            }
        }
    }

    /// Encode a record of the root type
    pub fn encode(&self, record: &Record) -> std::result::Result<Vec<u8>, EncodeError> {
        let desc = self
            .root_descriptor()
            .ok_or_else(|| EncodeError::UnknownType {
                field: String::new(),
                type_name: self.root.clone(),
            })?;

        let mut writer = XmlWriter::new(self.profile.indent);
        writer.start(
            &desc.name,
            self.profile
                .root_attributes
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )?;
        self.encode_fields(desc, record, &mut writer)?;
        writer.end(&desc.name)?;

        let body = writer.into_inner();
        let mut out = Vec::with_capacity(body.len() + XML_DECLARATION.len() + 1);
        if let Some(declaration) = &self.profile.declaration {
            out.extend_from_slice(declaration.as_bytes());
            out.push(b'\n');
        }
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Encode a record of the root type to a string
    pub fn encode_to_string(&self, record: &Record) -> std::result::Result<String, EncodeError> {
        let bytes = self.encode(record)?;
        String::from_utf8(bytes).map_err(|e| EncodeError::Xml(e.to_string()))
    }

    /// Encode a typed value keyed by wire names
    pub fn encode_from<T: Serialize>(&self, value: &T) -> std::result::Result<Vec<u8>, EncodeError> {
        let tree = serde_json::to_value(value)?;
        let record = json::record_from_json(&self.registry, &self.root, &tree)?;
        self.encode(&record)
    }

    fn encode_record(
        &self,
        desc: &TypeDescriptor,
        record: &Record,
        tag: &str,
        writer: &mut XmlWriter,
    ) -> std::result::Result<(), EncodeError> {
        writer.start(tag, std::iter::empty())?;
        self.encode_fields(desc, record, writer)?;
        writer.end(tag)
    }

    fn encode_fields(
        &self,
        desc: &TypeDescriptor,
        record: &Record,
        writer: &mut XmlWriter,
    ) -> std::result::Result<(), EncodeError> {
        for field in &desc.fields {
            match (&field.shape, record.get(&field.wire_name)) {
                (FieldShape::Comment, _) => {
                    if !record.comment().is_empty() {
                        writer.comment(record.comment())?;
                    }
                }
                (FieldShape::Untyped, _) => {}
                (FieldShape::Scalar { .. }, None) => {
                    return Err(EncodeError::MissingField {
                        type_name: desc.name.clone(),
                        field: field.wire_name.clone(),
                    });
                }
                (_, None) => {}
                (_, Some(value)) => self.encode_field(field, value, writer)?,
            }
        }
        Ok(())
    }

    fn encode_field(
        &self,
        field: &FieldDescriptor,
        value: &Value,
        writer: &mut XmlWriter,
    ) -> std::result::Result<(), EncodeError> {
        let wire = field.wire_name.as_str();
        match (&field.shape, value) {
            (FieldShape::Scalar { target } | FieldShape::OptionalScalar { target }, value) => {
                self.encode_value(wire, target, value, writer)
            }
            (FieldShape::ListWrapperReference { wrapper }, Value::Record(inner)) => {
                let desc = self.lookup(wire, wrapper)?;
                self.encode_record(desc, inner, wire, writer)
            }
            (FieldShape::ListWrapperReference { wrapper }, Value::List(items)) => {
                let desc = self.lookup(wire, wrapper)?;
                let mut inner = Record::new(desc.name.clone());
                if let Some(list) = desc.fields.iter().find(|f| f.kind() == ShapeKind::List) {
                    inner.set(list.wire_name.clone(), Value::List(items.clone()));
                }
                self.encode_record(desc, &inner, wire, writer)
            }
            (FieldShape::OrderedBagReference, Value::Properties(bag)) => {
                if bag.is_empty() {
                    return Ok(());
                }
                bag.write(writer, wire)
            }
            (FieldShape::OpaqueReference, Value::Inner(inner)) => {
                if inner.is_empty() {
                    return Ok(());
                }
                inner.write(writer, wire)
            }
            (FieldShape::List { item }, Value::List(items)) => {
                for item_value in items {
                    self.encode_value(wire, item, item_value, writer)?;
                }
                Ok(())
            }
            (shape, other) => Err(EncodeError::shape(
                wire,
                format!("{}, found {}", expected(shape), other.kind_name()),
            )),
        }
    }

    fn encode_value(
        &self,
        wire: &str,
        target: &TypeRef,
        value: &Value,
        writer: &mut XmlWriter,
    ) -> std::result::Result<(), EncodeError> {
        match (target, value) {
            (TypeRef::Primitive(kind), value) => {
                let text = format_primitive(wire, *kind, value)?;
                writer.text_element(wire, &text)
            }
            (TypeRef::Complex(name), Value::Record(inner)) => {
                let desc = self.lookup(wire, name)?;
                self.encode_record(desc, inner, wire, writer)
            }
            (TypeRef::Complex(name), other) => Err(EncodeError::shape(
                wire,
                format!("a {} record, found {}", name, other.kind_name()),
            )),
        }
    }

    fn lookup(&self, field: &str, type_name: &str) -> std::result::Result<&TypeDescriptor, EncodeError> {
        self.registry
            .get(type_name)
            .ok_or_else(|| EncodeError::UnknownType {
                field: field.to_string(),
                type_name: type_name.to_string(),
            })
    }
}

fn expected(shape: &FieldShape) -> String {
    match shape {
        FieldShape::Scalar { target } | FieldShape::OptionalScalar { target } => {
            format!("a {} value", target.display())
        }
        FieldShape::ListWrapperReference { wrapper } => format!("a {} record or a list", wrapper),
        FieldShape::OrderedBagReference => "properties".to_string(),
        FieldShape::OpaqueReference => "inner XML".to_string(),
        FieldShape::List { item } => format!("a list of {}", item.display()),
        FieldShape::Comment | FieldShape::Untyped => "no value".to_string(),
    }
}

/// Parse element text as a primitive
///
/// Empty text reads as the kind's zero value; anything else must parse.
pub(crate) fn parse_primitive(
    field: &str,
    kind: PrimitiveKind,
    text: &str,
) -> std::result::Result<Value, DecodeError> {
    let invalid = || DecodeError::InvalidValue {
        field: field.to_string(),
        kind: kind.name(),
        value: text.to_string(),
    };
    let trimmed = text.trim();

    match kind {
        PrimitiveKind::String => Ok(Value::String(text.to_string())),
        PrimitiveKind::Boolean => match trimmed {
            "true" | "1" => Ok(Value::Boolean(true)),
            "false" | "0" | "" => Ok(Value::Boolean(false)),
            _ => Err(invalid()),
        },
        PrimitiveKind::Integer if trimmed.is_empty() => Ok(Value::Integer(0)),
        PrimitiveKind::Integer => trimmed.parse::<i64>().map(Value::Integer).map_err(|_| invalid()),
        PrimitiveKind::Decimal if trimmed.is_empty() => Ok(Value::Decimal(Decimal::ZERO)),
        PrimitiveKind::Decimal => Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Value::Decimal)
            .map_err(|_| invalid()),
    }
}

fn format_primitive(
    field: &str,
    kind: PrimitiveKind,
    value: &Value,
) -> std::result::Result<String, EncodeError> {
    match (kind, value) {
        (PrimitiveKind::String, Value::String(s)) => Ok(s.clone()),
        (PrimitiveKind::Boolean, Value::Boolean(b)) => Ok(b.to_string()),
        (PrimitiveKind::Integer, Value::Integer(i)) => Ok(i.to_string()),
        (PrimitiveKind::Decimal, Value::Decimal(d)) => Ok(d.to_string()),
        (PrimitiveKind::Decimal, Value::Integer(i)) => Ok(i.to_string()),
        (kind, other) => Err(EncodeError::shape(
            field,
            format!("a {} value, found {}", kind, other.kind_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;
    use crate::schema::{ComplexType, ElementDecl, Schema, TypeName};

    fn widget_codec() -> ModelCodec {
        let schema = Schema::new()
            .with_type(
                ComplexType::new("Widget")
                    .with_element(ElementDecl::typed("name", TypeName::builtin("string")))
                    .with_element(ElementDecl::typed("count", TypeName::builtin("int")))
                    .with_element(ElementDecl::typed("enabled", TypeName::builtin("boolean")))
                    .with_element(ElementDecl::list("tags", "tag", TypeName::builtin("string")))
                    .with_element(ElementDecl::wildcard("extra"))
                    .with_element(ElementDecl::wildcard("properties")),
            );
        let registry = Arc::new(compile_schema(&schema).unwrap());
        ModelCodec::for_type(registry, "Widget")
            .unwrap()
            .with_profile(DocumentProfile::new().with_declaration(None).with_indent(None))
    }

    #[test]
    fn test_encode_compact() {
        let codec = widget_codec();
        let record = Record::new("Widget")
            .with("name", "w")
            .with("tags", vec!["a", "b"]);

        assert_eq!(
            codec.encode_to_string(&record).unwrap(),
            "<Widget><name>w</name><tags><tag>a</tag><tag>b</tag></tags></Widget>"
        );
    }

    #[test]
    fn test_decode_primitives() {
        let codec = widget_codec();
        let record = codec
            .decode_str("<Widget><count> 42 </count><enabled>true</enabled></Widget>")
            .unwrap();
        assert_eq!(record.get("count"), Some(&Value::Integer(42)));
        assert_eq!(record.get("enabled"), Some(&Value::Boolean(true)));
        assert!(record.get("name").is_none());
    }

    #[test]
    fn test_decode_invalid_primitive() {
        let codec = widget_codec();
        let err = codec
            .decode_str("<Widget><count>many</count></Widget>")
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { ref field, kind: "integer", .. } if field == "count"));
    }

    #[test]
    fn test_unexpected_root() {
        let err = widget_codec().decode_str("<Gadget/>").unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedRoot { ref found, .. } if found == "Gadget"));
    }

    #[test]
    fn test_unknown_elements_ignored() {
        let record = widget_codec()
            .decode_str("<Widget><color>red</color><name>w</name></Widget>")
            .unwrap();
        assert_eq!(record.get("name").and_then(Value::as_str), Some("w"));
        assert!(record.get("color").is_none());
    }

    #[test]
    fn test_empty_open_content_is_unset() {
        let record = widget_codec()
            .decode_str("<Widget><extra/><properties></properties></Widget>")
            .unwrap();
        assert!(record.get("extra").is_none());
        assert!(record.get("properties").is_none());
    }

    #[test]
    fn test_comment_written_last() {
        let codec = widget_codec();
        let record = codec
            .decode_str("<Widget><!-- top --><name>w</name></Widget>")
            .unwrap();
        assert_eq!(record.comment(), " top ");
        assert_eq!(
            codec.encode_to_string(&record).unwrap(),
            "<Widget><name>w</name><!-- top --></Widget>"
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let record = Record::new("Widget").with("count", "ten");
        let err = widget_codec().encode(&record).unwrap_err();
        assert!(matches!(err, EncodeError::ShapeMismatch { ref field, .. } if field == "count"));
    }

    #[test]
    fn test_pom_profile_root_attributes() {
        let codec = widget_codec().with_profile(DocumentProfile::pom().with_indent(None));
        let xml = codec.encode_to_string(&Record::new("Widget")).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Widget xmlns=\"http://maven.apache.org/POM/4.0.0\""));
        assert!(xml.contains("xsi:schemaLocation="));
    }

    #[test]
    fn test_unsigned_long_above_i64() {
        let kind = PrimitiveKind::from_builtin("unsignedLong").unwrap();
        let value = parse_primitive("size", kind, "18446744073709551615").unwrap();
        assert_eq!(value, Value::Decimal(Decimal::from(u64::MAX)));
        assert_eq!(
            format_primitive("size", kind, &value).unwrap(),
            "18446744073709551615"
        );
    }

    #[test]
    fn test_parse_primitive_edges() {
        assert_eq!(
            parse_primitive("f", PrimitiveKind::Boolean, "").unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            parse_primitive("f", PrimitiveKind::Decimal, "1.50").unwrap(),
            Value::Decimal(Decimal::new(150, 2))
        );
        assert!(parse_primitive("f", PrimitiveKind::Boolean, "yes").is_err());
        assert_eq!(
            parse_primitive("f", PrimitiveKind::String, " keep ").unwrap(),
            Value::String(" keep ".to_string())
        );
    }

    #[test]
    fn test_new_requires_root() {
        let registry = Arc::new(TypeRegistry::default());
        assert!(matches!(ModelCodec::new(registry), Err(Error::Config(_))));
    }
}
