//! Error types for xsdbind
//!
//! This module defines all error types used throughout the library.
//! Compilation, decoding and encoding each get their own error enum so that
//! callers can tell a broken schema apart from a broken document.

use thiserror::Error;

/// Result type alias using xsdbind Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdbind operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema is malformed or uses an unsupported shape
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Document does not fit the compiled shape
    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),

    /// Value cannot be written against the compiled shape
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while compiling a schema into type descriptors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document is not well-formed XML
    #[error("malformed schema document: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document root is not an `xs:schema` element
    #[error("expected an XML Schema root element, found '{found}'")]
    NotASchema {
        /// Local name of the root element actually found
        found: String,
    },

    /// A complex type or element carries no `name` attribute
    #[error("{kind} without a name in {context}")]
    MissingName {
        /// What kind of declaration is nameless
        kind: &'static str,
        /// Where the declaration appeared
        context: String,
    },

    /// A declared name is not a valid XML name
    #[error("{kind} name '{name}' is not a valid XML name")]
    InvalidName {
        /// What kind of declaration carries the name
        kind: &'static str,
        /// The offending name
        name: String,
    },

    /// An element declares two shapes at once
    #[error("element '{element}' in type '{type_name}' is ambiguous: {reason}")]
    AmbiguousElement {
        /// Owning complex type
        type_name: String,
        /// Element name
        element: String,
        /// Which shapes collide
        reason: &'static str,
    },

    /// An inline shape nests deeper than a single repeated, typed element
    #[error("element '{element}' in type '{type_name}' uses unsupported nesting: {reason}")]
    UnsupportedNesting {
        /// Owning complex type
        type_name: String,
        /// Element name
        element: String,
        /// What is unsupported
        reason: String,
    },

    /// A built-in type outside the recognized primitive table
    #[error("unsupported built-in type 'xs:{name}'")]
    UnsupportedPrimitive {
        /// Local name of the built-in
        name: String,
    },

    /// A complex type reference that resolves to nothing
    #[error("unknown type '{type_name}' referenced by '{owner}.{element}'")]
    UnresolvedType {
        /// Referenced type name
        type_name: String,
        /// Owning complex type
        owner: String,
        /// Referencing element
        element: String,
    },

    /// The same complex type name is declared twice
    #[error("duplicate complex type '{name}'")]
    DuplicateType {
        /// Type name
        name: String,
    },

    /// A synthesized wrapper name clashes with a declared type
    #[error("synthesized wrapper '{name}' collides with a declared complex type")]
    NameCollision {
        /// Wrapper name
        name: String,
    },

    /// Two list shapes share a wrapper name but not an item type
    #[error("wrapper '{name}' is synthesized with item type '{first}' and '{second}'")]
    ConflictingWrapper {
        /// Wrapper name
        name: String,
        /// Item type recorded first
        first: String,
        /// Conflicting item type
        second: String,
    },
}

/// Errors raised while decoding a document against compiled shapes
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The underlying XML parser rejected the input
    #[error("malformed XML at byte {position}: {message}")]
    Xml {
        /// Byte offset reported by the parser
        position: usize,
        /// Parser message
        message: String,
    },

    /// The input holds no root element at all
    #[error("document has no root element")]
    EmptyDocument,

    /// The root element does not match the codec's root type
    #[error("expected root element '{expected}', found '{found}'")]
    UnexpectedRoot {
        /// Root tag of the compiled root type
        expected: String,
        /// Tag found in the document
        found: String,
    },

    /// A primitive value does not parse as its declared kind
    #[error("invalid {kind} value '{value}' for '{field}'")]
    InvalidValue {
        /// Wire name of the field
        field: String,
        /// Declared primitive kind
        kind: &'static str,
        /// Offending text
        value: String,
    },

    /// A required scalar is absent
    #[error("missing required element '{field}' in '{type_name}'")]
    MissingField {
        /// Owning type
        type_name: String,
        /// Wire name of the field
        field: String,
    },

    /// A field references a type the registry does not know
    #[error("no compiled type named '{0}'")]
    UnknownType(String),

    /// A decode limit was exceeded
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// The typed bridge could not build the requested value
    #[error("typed conversion failed: {0}")]
    Typed(#[from] serde_json::Error),
}

/// Errors raised while encoding a value against compiled shapes
#[derive(Error, Debug)]
pub enum EncodeError {
    /// A field references a type absent from the registry
    #[error("field '{field}' references unknown type '{type_name}'")]
    UnknownType {
        /// Wire name of the referencing field
        field: String,
        /// Missing type name
        type_name: String,
    },

    /// A value does not have the shape its field declares
    #[error("field '{field}' expects {expected}")]
    ShapeMismatch {
        /// Wire name of the field
        field: String,
        /// Human readable shape description
        expected: String,
    },

    /// A required scalar is unset
    #[error("missing required element '{field}' in '{type_name}'")]
    MissingField {
        /// Owning type
        type_name: String,
        /// Wire name of the field
        field: String,
    },

    /// An element or attribute name that cannot be written as XML
    #[error("'{0}' is not a valid XML name")]
    InvalidName(String),

    /// The writer failed
    #[error("XML writer error: {0}")]
    Xml(String),

    /// The typed bridge could not read the value
    #[error("typed conversion failed: {0}")]
    Typed(#[from] serde_json::Error),
}

impl From<quick_xml::Error> for EncodeError {
    fn from(err: quick_xml::Error) -> Self {
        EncodeError::Xml(err.to_string())
    }
}

impl EncodeError {
    /// Create a shape mismatch error
    pub fn shape(field: impl Into<String>, expected: impl Into<String>) -> Self {
        EncodeError::ShapeMismatch {
            field: field.into(),
            expected: expected.into(),
        }
    }
}
