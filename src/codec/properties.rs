//! Ordered key/value bag
//!
//! Holds the children of an open-content element whose children are all
//! simple `<key>value</key>` pairs. Order and repeated keys are kept exactly.

use serde::{Deserialize, Serialize};

use crate::documents::{Element, Node, XmlWriter};
use crate::error::EncodeError;

/// Ordered `(key, value)` pairs with a leading comment slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// Comment written before the first pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Pairs in document order; keys may repeat
    #[serde(default)]
    pub entries: Vec<(String, String)>,
}

impl Properties {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping any earlier pair with the same key
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Append a pair, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Set the leading comment, builder style
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `key`, in order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No pairs and no comment; such a bag is never written
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.comment.as_deref().map_or(true, str::is_empty)
    }

    /// Read the children of an open-content element
    ///
    /// Every child element becomes a pair, whatever its tag. Comments are
    /// collected into the leading slot, since a bag has nowhere else to keep
    /// them.
    pub fn from_element(element: &Element) -> Self {
        let mut bag = Properties::new();
        for child in &element.children {
            match child {
                Node::Element(e) => bag.push(e.name.clone(), e.deep_text()),
                Node::Comment(body) if body.is_empty() => {}
                Node::Comment(body) => match bag.comment.as_mut() {
                    Some(existing) => {
                        existing.push('\n');
                        existing.push_str(body);
                    }
                    None => bag.comment = Some(body.clone()),
                },
                Node::Text(text) if text.trim().is_empty() => {}
                Node::Text(text) => {
                    tracing::debug!("ignoring loose text {:?} in property bag", text);
                }
            }
        }
        bag
    }

    /// Write the bag as `<tag>` with one child per pair
    pub fn write(&self, writer: &mut XmlWriter, tag: &str) -> Result<(), EncodeError> {
        writer.start(tag, std::iter::empty())?;
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            writer.comment(comment)?;
        }
        for (key, value) in self.iter() {
            writer.text_element(key, value)?;
        }
        writer.end(tag)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            comment: None,
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    fn decode(xml: &str) -> Properties {
        let doc = Document::from_string(xml).unwrap();
        Properties::from_element(doc.root().unwrap())
    }

    #[test]
    fn test_duplicate_keys_preserved() {
        let bag = decode("<properties><foo>1</foo><bar>x</bar><foo>2</foo></properties>");
        assert_eq!(
            bag.iter().collect::<Vec<_>>(),
            vec![("foo", "1"), ("bar", "x"), ("foo", "2")]
        );
        assert_eq!(bag.get("foo"), Some("1"));
        assert_eq!(bag.get_all("foo").collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn test_leading_comment() {
        let bag = decode("<properties><!-- versions --><a.version>1.0</a.version></properties>");
        assert_eq!(bag.comment.as_deref(), Some(" versions "));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_empty_comment_is_unset() {
        let bag = decode("<properties><!----><k>v</k></properties>");
        assert_eq!(bag.comment, None);

        let mut writer = XmlWriter::new(None);
        bag.write(&mut writer, "properties").unwrap();
        let again = decode(&String::from_utf8(writer.into_inner()).unwrap());
        assert_eq!(again, bag);
    }

    #[test]
    fn test_values_keep_whitespace() {
        let bag = decode("<properties>\n  <sep> </sep>\n  <args> -a  -b </args>\n</properties>");
        assert_eq!(
            bag.iter().collect::<Vec<_>>(),
            vec![("sep", " "), ("args", " -a  -b ")]
        );
    }

    #[test]
    fn test_empty_bag() {
        assert!(decode("<properties/>").is_empty());
        assert!(!Properties::new().with_comment("x").is_empty());
    }

    #[test]
    fn test_write_order_and_comment() {
        let bag: Properties = vec![("foo", "1"), ("foo", "2")].into_iter().collect();
        let bag = bag.with_comment("c");

        let mut writer = XmlWriter::new(None);
        bag.write(&mut writer, "properties").unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            xml,
            "<properties><!--c--><foo>1</foo><foo>2</foo></properties>"
        );
    }

    #[test]
    fn test_serde_shape() {
        let bag = Properties::new().with("k", "v");
        let json = serde_json::to_string(&bag).unwrap();
        assert_eq!(json, r#"{"entries":[["k","v"]]}"#);
        let back: Properties = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bag);
    }
}
