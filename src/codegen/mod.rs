//! Declaration emitters
//!
//! Output is plain source text; formatting and writing it to disk are left to
//! the caller.

mod rust;

pub use rust::RustGenerator;

use crate::compiler::TypeRegistry;

/// Generates Rust declarations for every type in `registry`.
#[must_use]
pub fn generate_rust(registry: &TypeRegistry) -> String {
    RustGenerator::new(registry).generate()
}
