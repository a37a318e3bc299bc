//! Opaque captured subtree

use serde::{Deserialize, Serialize};

use crate::documents::{Document, Element, Node, XmlWriter};
use crate::error::{DecodeError, EncodeError};

/// Uninterpreted child markup of an open-content element
///
/// Tags, attributes, text, nesting and inner comments are kept as parsed and
/// written back unchanged. Only a comment that is the very first child moves
/// into the leading `comment` slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerXml {
    /// Comment written before the captured nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Captured child nodes
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl InnerXml {
    /// Create an empty capture
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a markup fragment, e.g. `<source>17</source><target>17</target>`
    pub fn parse(fragment: &str) -> Result<Self, DecodeError> {
        let wrapped = format!("<fragment>{}</fragment>", fragment);
        let doc = Document::from_string(&wrapped)?;
        let root = doc.root().ok_or(DecodeError::EmptyDocument)?;
        Ok(Self::from_element(root))
    }

    /// Capture the children of an element
    pub fn from_element(element: &Element) -> Self {
        let mut children = element.children.iter();
        let mut capture = InnerXml::new();
        if let Some(Node::Comment(body)) = element.children.first() {
            if !body.is_empty() {
                capture.comment = Some(body.clone());
            }
            children.next();
        }
        capture.nodes = children.cloned().collect();
        if capture.nodes.iter().all(is_layout) {
            capture.nodes.clear();
        }
        capture
    }

    /// Set the leading comment, builder style
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Captured child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }

    /// No nodes and no comment; such a capture is never written
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.comment.as_deref().map_or(true, str::is_empty)
    }

    /// The capture as compact markup, leading comment included
    pub fn to_xml_string(&self) -> Result<String, EncodeError> {
        let mut writer = XmlWriter::new(None);
        self.write_content(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| EncodeError::Xml(e.to_string()))
    }

    /// Write the capture as `<tag>` around the captured nodes
    pub fn write(&self, writer: &mut XmlWriter, tag: &str) -> Result<(), EncodeError> {
        writer.start(tag, std::iter::empty())?;
        self.write_content(writer)?;
        writer.end(tag)
    }

    fn write_content(&self, writer: &mut XmlWriter) -> Result<(), EncodeError> {
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            writer.comment(comment)?;
        }
        for node in &self.nodes {
            writer.node(node)?;
        }
        Ok(())
    }
}

/// Whitespace-only text carries no content of its own
fn is_layout(node: &Node) -> bool {
    matches!(node, Node::Text(t) if t.trim().is_empty())
}
