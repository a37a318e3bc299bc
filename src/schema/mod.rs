//! Schema model
//!
//! The parsed form of a flat configuration-document XSD:
//! - complex types with an `all` group of child elements
//! - inline list shapes (one repeated, typed element)
//! - inline open-content shapes (one wildcard)
//! - annotations, whose second documentation entry is the description

mod builtins;
mod model;
mod parsing;

pub use builtins::{normalize_primitive, PrimitiveKind, XSD_NAMESPACE};
pub use model::{
    Annotation, ComplexType, Documentation, ElementDecl, InlineShape, RootElement, Schema,
    SequenceElement, TypeName, Wildcard,
};
pub use parsing::parse_schema;
