//! # xsdbind
//!
//! Compile flat XML Schemas describing configuration documents into typed
//! record shapes, and round-trip documents against those shapes.
//!
//! The canonical target is a build project descriptor: root element
//! `project`, root type `Model`, and a flat list of named complex types.
//!
//! ## Features
//!
//! - Schema compiler with one shape per field: scalar, list wrapper, ordered
//!   key/value bag, or opaque subtree
//! - Shared list wrappers, deduplicated per compilation run
//! - Comment-preserving, order-preserving document codec
//! - Rust declaration generation for the compiled types
//! - Typed bridge between generated structs and the dynamic codec
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xsdbind::{compile_schema, parse_schema, DocumentProfile, ModelCodec};
//!
//! let schema = parse_schema(&std::fs::read_to_string("maven-4.0.0.xsd")?)?;
//! let registry = Arc::new(compile_schema(&schema)?);
//!
//! let codec = ModelCodec::new(registry)?.with_profile(DocumentProfile::pom());
//! let model = codec.decode(&std::fs::read("pom.xml")?)?;
//! let bytes = codec.encode(&model)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod names;

// Schema side
pub mod compiler;
pub mod schema;

// Runtime side
pub mod codec;
pub mod documents;

// Declaration output
pub mod codegen;

// Re-exports for convenience
pub use codec::{DocumentProfile, InnerXml, ModelCodec, Properties, Record, Value};
pub use codegen::{generate_rust, RustGenerator};
pub use compiler::{
    compile_schema, CompilerConfig, FieldDescriptor, FieldShape, ShapeKind, TypeCompiler,
    TypeDescriptor, TypeRef, TypeRegistry,
};
pub use error::{DecodeError, EncodeError, Error, Result, SchemaError};
pub use limits::Limits;
pub use names::AcronymTable;
pub use schema::{parse_schema, PrimitiveKind, Schema};

/// Version of the xsdbind library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace
pub const XSD_NAMESPACE: &str = schema::XSD_NAMESPACE;
