//! Schema compiler
//!
//! Turns a [`Schema`](crate::schema::Schema) into an ordered, immutable
//! [`TypeRegistry`]. Each child element becomes one field, classified by
//! [`FieldMapper`] as a scalar, a list wrapper reference, an ordered
//! key/value bag or an opaque subtree.

mod config;
mod descriptors;
mod fields;
mod types;

pub use config::CompilerConfig;
pub use descriptors::{
    FieldDescriptor, FieldShape, ShapeKind, TypeDescriptor, TypeOrigin, TypeRef, TypeRegistry,
    COMMENT_KEY,
};
pub use fields::{CompileScope, FieldMapper};
pub use types::{compile_schema, TypeCompiler};
