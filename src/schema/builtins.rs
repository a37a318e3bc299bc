//! Built-in primitive normalization
//!
//! Every XML Schema built-in the compiler accepts folds into one of a closed
//! set of primitive kinds. The codec parses and prints values by kind, and the
//! declaration emitter picks the Rust type by kind.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SchemaError;

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Recognized primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Any string-valued built-in (including dates, URIs and tokens)
    String,
    /// `xs:boolean`
    Boolean,
    /// The bounded integer family, held as `i64`
    Integer,
    /// `xs:decimal`, `xs:float`, `xs:double` and the unbounded integers
    Decimal,
}

impl PrimitiveKind {
    /// Normalize a built-in by local name
    pub fn from_builtin(local_name: &str) -> Option<Self> {
        let kind = match local_name {
            "string" | "normalizedString" | "token" | "language" | "Name" | "NCName" | "ID"
            | "IDREF" | "IDREFS" | "ENTITY" | "ENTITIES" | "NMTOKEN" | "NMTOKENS" | "anyURI"
            | "QName" | "NOTATION" | "duration" | "dateTime" | "time" | "date" | "gYearMonth"
            | "gYear" | "gMonthDay" | "gDay" | "gMonth" | "hexBinary" | "base64Binary"
            | "anySimpleType" => PrimitiveKind::String,
            "boolean" => PrimitiveKind::Boolean,
            "long" | "int" | "short" | "byte" | "unsignedInt" | "unsignedShort"
            | "unsignedByte" => PrimitiveKind::Integer,
            // values may exceed i64
            "integer" | "nonNegativeInteger" | "positiveInteger" | "nonPositiveInteger"
            | "negativeInteger" | "unsignedLong" | "decimal" | "float" | "double" => {
                PrimitiveKind::Decimal
            }
            _ => return None,
        };
        Some(kind)
    }

    /// Short lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Decimal => "decimal",
        }
    }

    /// Rust type used in generated declarations
    pub fn rust_type(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "String",
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::Integer => "i64",
            PrimitiveKind::Decimal => "rust_decimal::Decimal",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize a built-in, failing on names outside the table
pub fn normalize_primitive(local_name: &str) -> Result<PrimitiveKind, SchemaError> {
    PrimitiveKind::from_builtin(local_name).ok_or_else(|| SchemaError::UnsupportedPrimitive {
        name: local_name.to_string(),
    })
}
