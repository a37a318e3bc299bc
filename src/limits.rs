//! Limits applied while decoding documents
//!
//! Decoding builds a full in-memory tree before shapes are applied, so the
//! input size, nesting depth and attribute count are capped.

use crate::error::DecodeError;

/// Decode limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_xml_depth: usize,
    /// Maximum input size in bytes
    pub max_xml_size: usize,
    /// Maximum number of attributes on one element
    pub max_attributes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 256,
            max_xml_size: 64 * 1024 * 1024,
            max_attributes: 256,
        }
    }
}

impl Limits {
    /// Create limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Tighter limits for input from untrusted sources
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 64,
            max_xml_size: 4 * 1024 * 1024,
            max_attributes: 32,
        }
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_xml_depth = depth;
        self
    }

    /// Set the maximum input size
    pub fn with_max_size(mut self, bytes: usize) -> Self {
        self.max_xml_size = bytes;
        self
    }

    /// Check an element nesting depth
    pub fn check_xml_depth(&self, depth: usize) -> Result<(), DecodeError> {
        check("nesting depth", depth, self.max_xml_depth)
    }

    /// Check an input size in bytes
    pub fn check_xml_size(&self, size: usize) -> Result<(), DecodeError> {
        check("input size in bytes", size, self.max_xml_size)
    }

    /// Check the attribute count of one element
    pub fn check_attributes(&self, count: usize) -> Result<(), DecodeError> {
        check("attribute count", count, self.max_attributes)
    }
}

fn check(what: &str, value: usize, max: usize) -> Result<(), DecodeError> {
    if value > max {
        return Err(DecodeError::LimitExceeded(format!(
            "{} {} is above the maximum of {}",
            what, value, max
        )));
    }
    Ok(())
}
