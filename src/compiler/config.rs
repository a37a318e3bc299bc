//! Compiler configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::names::AcronymTable;

/// Configuration for [`TypeCompiler`](super::TypeCompiler)
///
/// Every setting has a default matching the project-descriptor schema family,
/// so `CompilerConfig::default()` compiles such schemas as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Schema type to rename; defaults to the top-level element's type
    root_type: Option<String>,
    /// Name given to the root type; defaults to the top-level element's name
    root_tag: Option<String>,
    /// Wildcard elements decoded as ordered key/value bags
    property_bag_elements: Vec<String>,
    /// Suffix corrections for display names
    acronyms: AcronymTable,
    /// Prefix for synthesized list wrapper names
    wrapper_prefix: String,
    /// Treat every typed leaf as optional regardless of `minOccurs`
    optional_leaves: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            root_type: None,
            root_tag: None,
            property_bag_elements: vec!["properties".to_string()],
            acronyms: AcronymTable::default(),
            wrapper_prefix: "Sequence".to_string(),
            optional_leaves: true,
        }
    }
}

impl CompilerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Get the root type override
    pub fn root_type(&self) -> Option<&str> {
        self.root_type.as_deref()
    }

    /// Get the root tag override
    pub fn root_tag(&self) -> Option<&str> {
        self.root_tag.as_deref()
    }

    /// Get the property bag element names
    pub fn property_bag_elements(&self) -> &[String] {
        &self.property_bag_elements
    }

    /// Check if a wildcard element is a property bag
    pub fn is_property_bag(&self, element: &str) -> bool {
        self.property_bag_elements.iter().any(|e| e == element)
    }

    /// Get the acronym table
    pub fn acronyms(&self) -> &AcronymTable {
        &self.acronyms
    }

    /// Get the wrapper prefix
    pub fn wrapper_prefix(&self) -> &str {
        &self.wrapper_prefix
    }

    /// Check if typed leaves are always optional
    pub fn optional_leaves(&self) -> bool {
        self.optional_leaves
    }

    /// Rename `root_type` to `root_tag`
    pub fn with_root(mut self, root_type: impl Into<String>, root_tag: impl Into<String>) -> Self {
        self.root_type = Some(root_type.into());
        self.root_tag = Some(root_tag.into());
        self
    }

    /// Set the property bag element names
    pub fn with_property_bag_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_bag_elements = elements.into_iter().map(Into::into).collect();
        self
    }

    /// Set the acronym table
    pub fn with_acronyms(mut self, acronyms: AcronymTable) -> Self {
        self.acronyms = acronyms;
        self
    }

    /// Set the wrapper prefix
    pub fn with_wrapper_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.wrapper_prefix = prefix.into();
        self
    }

    /// Set whether typed leaves are always optional
    pub fn with_optional_leaves(mut self, optional: bool) -> Self {
        self.optional_leaves = optional;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CompilerConfig::default();
        assert!(config.is_property_bag("properties"));
        assert!(!config.is_property_bag("configuration"));
        assert_eq!(config.wrapper_prefix(), "Sequence");
        assert!(config.optional_leaves());
        assert_eq!(config.root_type(), None);
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = CompilerConfig::from_json(
            r#"{"property_bag_elements": ["props"], "acronyms": [{"suffix": "Api", "replacement": "API"}]}"#,
        )
        .unwrap();
        assert!(config.is_property_bag("props"));
        assert!(!config.is_property_bag("properties"));
        assert_eq!(config.acronyms().apply("RestApi"), "RestAPI");
        assert_eq!(config.wrapper_prefix(), "Sequence");
    }

    #[test]
    fn test_config_from_json_invalid() {
        let err = CompilerConfig::from_json("{").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder() {
        let config = CompilerConfig::new()
            .with_root("Model", "project")
            .with_wrapper_prefix("ListOf")
            .with_optional_leaves(false)
            .with_acronyms(AcronymTable::empty());
        assert_eq!(config.acronyms().apply("GroupId"), "GroupId");
        assert_eq!(config.root_type(), Some("Model"));
        assert_eq!(config.root_tag(), Some("project"));
        assert_eq!(config.wrapper_prefix(), "ListOf");
        assert!(!config.optional_leaves());
    }
}
