//! Runtime document codec
//!
//! Decoded documents are held as [`Record`] trees keyed by wire names. The two
//! open-content containers, [`Properties`] and [`InnerXml`], carry their own
//! leading comment slot and keep child order exactly.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xsdbind::{compile_schema, parse_schema, DocumentProfile, ModelCodec};
//!
//! let registry = Arc::new(compile_schema(&parse_schema(xsd)?)?);
//! let codec = ModelCodec::new(registry)?.with_profile(DocumentProfile::pom());
//! let model = codec.decode(bytes)?;
//! let out = codec.encode(&model)?;
//! ```

mod inner;
pub mod json;
mod model;
mod properties;
mod values;

pub use inner::InnerXml;
pub use model::{DocumentProfile, ModelCodec, XML_DECLARATION};
pub use properties::Properties;
pub use values::{Record, Value};
