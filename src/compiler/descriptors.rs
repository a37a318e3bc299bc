//! Compiled type and field descriptors

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::PrimitiveKind;

/// Wire key of the comment slot every descriptor carries
pub const COMMENT_KEY: &str = "#comment";

/// What a field's value refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TypeRef {
    /// A built-in primitive
    Primitive(PrimitiveKind),
    /// A compiled complex type, by registry name
    Complex(String),
}

impl TypeRef {
    /// Readable name, e.g. `string` or `Dependency`
    pub fn display(&self) -> String {
        match self {
            TypeRef::Primitive(kind) => kind.name().to_string(),
            TypeRef::Complex(name) => name.clone(),
        }
    }
}

/// Shape kind of a field, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Exactly one value
    Scalar,
    /// Zero or one value
    OptionalScalar,
    /// Optional reference to a list wrapper
    ListWrapperReference,
    /// Optional ordered key/value bag
    OrderedBagReference,
    /// Optional captured subtree
    OpaqueReference,
    /// Repeated values inside a list wrapper
    List,
    /// Comment slot
    Comment,
    /// Field with neither type nor content
    Untyped,
}

/// How a field is stored and serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum FieldShape {
    /// Required single value
    Scalar {
        /// Value type
        target: TypeRef,
    },
    /// Optional single value
    OptionalScalar {
        /// Value type
        target: TypeRef,
    },
    /// Optional reference to a synthesized list wrapper
    ListWrapperReference {
        /// Wrapper descriptor name
        wrapper: String,
    },
    /// Optional ordered key/value bag
    OrderedBagReference,
    /// Optional opaque subtree
    OpaqueReference,
    /// Ordered, possibly empty sequence of repeated elements
    List {
        /// Item type
        item: TypeRef,
    },
    /// Comment slot
    Comment,
    /// Unused schema fragment; carried but never read or written
    Untyped,
}

impl FieldShape {
    /// Payload-free kind
    pub fn kind(&self) -> ShapeKind {
        match self {
            FieldShape::Scalar { .. } => ShapeKind::Scalar,
            FieldShape::OptionalScalar { .. } => ShapeKind::OptionalScalar,
            FieldShape::ListWrapperReference { .. } => ShapeKind::ListWrapperReference,
            FieldShape::OrderedBagReference => ShapeKind::OrderedBagReference,
            FieldShape::OpaqueReference => ShapeKind::OpaqueReference,
            FieldShape::List { .. } => ShapeKind::List,
            FieldShape::Comment => ShapeKind::Comment,
            FieldShape::Untyped => ShapeKind::Untyped,
        }
    }
}

/// One field of a compiled type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Display name
    pub name: String,
    /// Exact schema element name
    pub wire_name: String,
    /// Storage and serialization shape
    #[serde(flatten)]
    pub shape: FieldShape,
    /// Schema default value, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Description text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Unset or empty values are left out when encoding
    pub omit_empty: bool,
}

impl FieldDescriptor {
    /// Create a field
    pub fn new(name: impl Into<String>, wire_name: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            wire_name: wire_name.into(),
            shape,
            default: None,
            documentation: None,
            omit_empty: true,
        }
    }

    /// The comment slot
    pub fn comment() -> Self {
        Self::new("Comment", COMMENT_KEY, FieldShape::Comment)
    }

    /// Payload-free kind
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Referenced type for scalar and list fields
    pub fn target(&self) -> Option<&TypeRef> {
        match &self.shape {
            FieldShape::Scalar { target } | FieldShape::OptionalScalar { target } => Some(target),
            FieldShape::List { item } => Some(item),
            _ => None,
        }
    }

    /// Wrapper name for list wrapper references
    pub fn wrapper(&self) -> Option<&str> {
        match &self.shape {
            FieldShape::ListWrapperReference { wrapper } => Some(wrapper),
            _ => None,
        }
    }

    /// Whether this is the comment slot
    pub fn is_comment(&self) -> bool {
        matches!(self.shape, FieldShape::Comment)
    }
}

/// Where a compiled type came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeOrigin {
    /// A named complex type
    Declared,
    /// The schema's root type, renamed to the document root tag
    Root,
    /// A wrapper synthesized for a repeated element
    ListWrapper,
}

/// One compiled type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Registry name; for the root type this is the document root tag
    pub name: String,
    /// Name in the schema, when it differs from `name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Description text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Fields in serialization order, comment slot included
    pub fields: Vec<FieldDescriptor>,
    /// Origin of the type
    pub origin: TypeOrigin,
}

impl TypeDescriptor {
    /// Find a field by wire name
    pub fn field(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    /// Fields other than the comment slot
    pub fn data_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_comment())
    }

    /// Display names of all fields, comment slot included
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether this type was synthesized for a repeated element
    pub fn is_list_wrapper(&self) -> bool {
        self.origin == TypeOrigin::ListWrapper
    }
}

/// Immutable, ordered set of compiled types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
    root: Option<String>,
}

impl TypeRegistry {
    pub(crate) fn from_parts(types: IndexMap<String, TypeDescriptor>, root: Option<String>) -> Self {
        Self { types, root }
    }

    /// Look up a type by registry name
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Check if a type exists
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Types in compilation order
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Type names in compilation order
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(|k| k.as_str()).collect()
    }

    /// Number of compiled types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if nothing was compiled
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The document root type, if the schema designated one
    pub fn root(&self) -> Option<&TypeDescriptor> {
        self.root.as_deref().and_then(|name| self.types.get(name))
    }

    /// Pretty JSON dump of the registry
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
