//! XML document tree handling
//!
//! This module reads runtime documents into an ordered node tree that keeps
//! comments and element order, and writes such trees back out. Names are kept
//! exactly as written (prefix included) so captured markup re-emits verbatim.

use crate::error::{DecodeError, EncodeError};
use crate::limits::Limits;
use crate::names::{is_valid_qname, local_name};
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

/// A node in element content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// Child element
    Element(Element),
    /// Character data (CDATA sections are folded into text)
    Text(String),
    /// Comment body, without the `<!--` `-->` delimiters
    Comment(String),
}

impl Node {
    /// Get the element if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// XML Element in the document tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Element name as written, prefix included
    pub name: String,
    /// Attributes in document order
    pub attributes: IndexMap<String, String>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Add a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Add a text node
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Concatenated text of this element and all descendants
    pub fn deep_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            Node::Comment(_) => {}
        }
    }
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
    /// Comments found before the root element
    pub prolog_comments: Vec<String>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self, DecodeError> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes with default limits
    pub fn parse(xml: &[u8]) -> Result<Self, DecodeError> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self, DecodeError> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_reader(xml);

        let mut doc = Document::new();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| DecodeError::Xml {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;

            match event {
                Event::Start(e) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&e, &reader, limits)?;
                    element_stack.push(element);
                }
                Event::End(_) => {
                    if let Some(mut current) = element_stack.pop() {
                        strip_layout(&mut current);
                        if let Some(parent) = element_stack.last_mut() {
                            parent.add_child(Node::Element(current));
                        } else if doc.root.is_none() {
                            doc.root = Some(current);
                        }
                    }
                }
                Event::Empty(e) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&e, &reader, limits)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.add_child(Node::Element(element));
                    } else if doc.root.is_none() {
                        doc.root = Some(element);
                    }
                }
                Event::Text(e) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e.unescape().map_err(|e| DecodeError::Xml {
                            position: reader.buffer_position(),
                            message: format!("failed to unescape text: {}", e),
                        })?;
                        push_text(current, &text);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = element_stack.last_mut() {
                        let raw = e.into_inner();
                        let text = std::str::from_utf8(&raw).map_err(|e| DecodeError::Xml {
                            position: reader.buffer_position(),
                            message: format!("invalid UTF-8 in CDATA: {}", e),
                        })?;
                        push_text(current, text);
                    }
                }
                Event::Comment(e) => {
                    let body = std::str::from_utf8(&e)
                        .map_err(|e| DecodeError::Xml {
                            position: reader.buffer_position(),
                            message: format!("invalid UTF-8 in comment: {}", e),
                        })?
                        .to_string();
                    match element_stack.last_mut() {
                        Some(current) => current.add_child(Node::Comment(body)),
                        None if doc.root.is_none() => doc.prolog_comments.push(body),
                        None => {}
                    }
                }
                Event::Eof => break,
                _ => {} // Declarations, processing instructions, doctypes
            }
            buf.clear();
        }

        if let Some(open) = element_stack.first() {
            return Err(DecodeError::Xml {
                position: reader.buffer_position(),
                message: format!("unclosed element '{}'", open.name),
            });
        }

        Ok(doc)
    }

    /// Parse element from BytesStart event
    fn parse_element(
        start: &BytesStart,
        reader: &Reader<&[u8]>,
        limits: &Limits,
    ) -> Result<Element, DecodeError> {
        let xml_err = |message: String| DecodeError::Xml {
            position: reader.buffer_position(),
            message,
        };

        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| xml_err(format!("invalid element name: {}", e)))?
            .to_string();

        let mut element = Element::new(name);

        for attr_result in start.attributes() {
            let attr = attr_result.map_err(|e| xml_err(format!("failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| xml_err(format!("invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| xml_err(format!("failed to unescape attribute value: {}", e)))?
                .to_string();

            element.attributes.insert(attr_name, attr_value);
        }
        limits.check_attributes(element.attributes.len())?;

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}

/// Drop indentation between structural children
///
/// Text in a leaf element is its value and stays untouched. Once an element
/// holds child elements or comments, whitespace-only runs between them are
/// layout.
fn strip_layout(element: &mut Element) {
    let structured = element
        .children
        .iter()
        .any(|n| !matches!(n, Node::Text(_)));
    if structured {
        element
            .children
            .retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));
    }
}

/// Merge adjacent text so CDATA and entity splits read as one value
fn push_text(element: &mut Element, text: &str) {
    if let Some(Node::Text(last)) = element.children.last_mut() {
        last.push_str(text);
    } else {
        element.add_child(Node::Text(text.to_string()));
    }
}

fn checked_name(name: &str) -> Result<&str, EncodeError> {
    if is_valid_qname(name) {
        Ok(name)
    } else {
        Err(EncodeError::InvalidName(name.to_string()))
    }
}

/// Streaming XML writer over an in-memory buffer
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Create a writer; `indent` is the number of spaces per level, if any
    pub fn new(indent: Option<usize>) -> Self {
        let inner = match indent {
            Some(width) if width > 0 => Writer::new_with_indent(Vec::new(), b' ', width),
            _ => Writer::new(Vec::new()),
        };
        Self { inner }
    }

    /// Open an element with attributes
    pub fn start<'a, I>(&mut self, name: &str, attributes: I) -> Result<(), EncodeError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut start = BytesStart::new(checked_name(name)?);
        for (key, value) in attributes {
            start.push_attribute((checked_name(key)?, value));
        }
        self.inner.write_event(Event::Start(start))?;
        Ok(())
    }

    /// Close an element
    pub fn end(&mut self, name: &str) -> Result<(), EncodeError> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Write escaped character data
    ///
    /// Empty text is still written as an event so the indenting writer keeps
    /// the closing tag on the same line.
    pub fn text(&mut self, text: &str) -> Result<(), EncodeError> {
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Write `<name>text</name>`
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<(), EncodeError> {
        self.start(name, std::iter::empty())?;
        self.text(text)?;
        self.end(name)
    }

    /// Write a comment; `--` is not allowed inside comments and is split
    pub fn comment(&mut self, body: &str) -> Result<(), EncodeError> {
        let mut safe = body.replace("--", "- -");
        if safe.ends_with('-') {
            safe.push(' ');
        }
        self.inner
            .write_event(Event::Comment(BytesText::from_escaped(safe)))?;
        Ok(())
    }

    /// Write a node and everything below it
    pub fn node(&mut self, node: &Node) -> Result<(), EncodeError> {
        match node {
            Node::Element(e) => self.element(e),
            Node::Text(t) => self.text(t),
            Node::Comment(c) => self.comment(c),
        }
    }

    /// Write an element and everything below it
    pub fn element(&mut self, element: &Element) -> Result<(), EncodeError> {
        self.start(
            &element.name,
            element
                .attributes
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )?;
        if element.children.is_empty() {
            self.text("")?;
        }
        for child in &element.children {
            self.node(child)?;
        }
        self.end(&element.name)
    }

    /// Consume the writer and return the bytes written
    pub fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.root.is_none());
    }

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        let child = root.children[0].as_element().unwrap();
        assert_eq!(child.local_name(), "child");
        assert_eq!(child.text(), "text");
    }

    #[test]
    fn test_parse_keeps_comments_in_order() {
        let xml = r#"<root><!-- first --><a/><!--second--><b>x</b></root>"#;
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root.unwrap();

        assert_eq!(root.children.len(), 4);
        assert_eq!(root.children[0], Node::Comment(" first ".to_string()));
        assert!(matches!(&root.children[1], Node::Element(e) if e.name == "a"));
        assert_eq!(root.children[2], Node::Comment("second".to_string()));
    }

    #[test]
    fn test_parse_with_attributes_in_order() {
        let xml = r#"<root xmlns:xsi="urn:x" b="2" a="1"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        let names: Vec<&str> = root.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["xmlns:xsi", "b", "a"]);
        assert_eq!(root.attributes.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_parse_prefixed_name() {
        let doc = Document::from_string(r#"<p:root xmlns:p="urn:p"/>"#).unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.name, "p:root");
        assert_eq!(root.local_name(), "root");
    }

    #[test]
    fn test_parse_cdata_and_entities() {
        let xml = "<root><v>a &amp; <![CDATA[<b>]]></v></root>";
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root.unwrap();
        let v = root.children[0].as_element().unwrap();
        assert_eq!(v.text(), "a &<b>");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = Document::from_string("<root><a></root>").unwrap_err();
        assert!(matches!(err, DecodeError::Xml { .. }));
    }

    #[test]
    fn test_parse_depth_limit() {
        let limits = Limits {
            max_xml_depth: 2,
            ..Limits::default()
        };
        let err = Document::parse_with_limits(b"<a><b><c/></b></a>", &limits).unwrap_err();
        assert!(matches!(err, DecodeError::LimitExceeded(_)));
    }

    #[test]
    fn test_leaf_text_kept_verbatim() {
        let xml = "<root>\n  <name>  two  words </name>\n  <sep> </sep>\n</root>";
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root.unwrap();

        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].as_element().unwrap().text(), "  two  words ");
        assert_eq!(root.children[1].as_element().unwrap().text(), " ");
    }

    #[test]
    fn test_layout_dropped_around_comments() {
        let xml = "<root>\n  <!-- c -->\n  <a>1</a>\n</root>";
        let root = Document::from_string(xml).unwrap().root.unwrap();
        assert_eq!(root.children.len(), 2);
        assert!(matches!(&root.children[0], Node::Comment(_)));
    }

    #[test]
    fn test_mixed_content_spacing() {
        let xml = "<p>hello <b>big</b> world</p>";
        let root = Document::from_string(xml).unwrap().root.unwrap();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0], Node::Text("hello ".to_string()));
        assert_eq!(root.children[2], Node::Text(" world".to_string()));
    }

    #[test]
    fn test_writer_empty_element_stays_empty() {
        let element = Element::new("root").with_child(Element::new("b"));
        let mut writer = XmlWriter::new(Some(2));
        writer.element(&element).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "<root>\n  <b></b>\n</root>");
    }

    #[test]
    fn test_writer_compact() {
        let element = Element::new("root")
            .with_attribute("k", "v&")
            .with_child(Element::new("a").with_text("1 < 2"));
        let mut writer = XmlWriter::new(None);
        writer.element(&element).unwrap();
        writer.comment("note").unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, r#"<root k="v&amp;"><a>1 &lt; 2</a></root><!--note-->"#);
    }

    #[test]
    fn test_writer_rejects_invalid_names() {
        let mut writer = XmlWriter::new(None);
        let err = writer.start("two words", std::iter::empty()).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidName(ref n) if n == "two words"));

        let err = writer.start("ok", [("1st", "v")]).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidName(ref n) if n == "1st"));
    }

    #[test]
    fn test_writer_output_reparses() {
        let element = Element::new("root")
            .with_child(Element::new("a").with_text("x"))
            .with_child(Element::new("b"));
        let mut writer = XmlWriter::new(Some(2));
        writer.element(&element).unwrap();

        let bytes = writer.into_inner();
        let doc = Document::parse(&bytes).unwrap();
        assert_eq!(doc.root.unwrap(), element);
    }
}
