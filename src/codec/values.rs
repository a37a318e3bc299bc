//! Dynamic values decoded against compiled types

use indexmap::IndexMap;
use rust_decimal::Decimal;

use super::inner::InnerXml;
use super::properties::Properties;

/// A field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `string` primitive
    String(String),
    /// `boolean` primitive
    Boolean(bool),
    /// `integer` primitive
    Integer(i64),
    /// `decimal` primitive
    Decimal(Decimal),
    /// Nested complex type, or a list wrapper
    Record(Record),
    /// Repeated items of a list field
    List(Vec<Value>),
    /// Ordered key/value bag
    Properties(Properties),
    /// Opaque captured subtree
    Inner(InnerXml),
}

impl Value {
    /// Get the string if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the record if this is a record value
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Get the items if this is a list value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the bag if this is a properties value
    pub fn as_properties(&self) -> Option<&Properties> {
        match self {
            Value::Properties(p) => Some(p),
            _ => None,
        }
    }

    /// Get the capture if this is an opaque value
    pub fn as_inner(&self) -> Option<&InnerXml> {
        match self {
            Value::Inner(i) => Some(i),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Record(_) => "record",
            Value::List(_) => "list",
            Value::Properties(_) => "properties",
            Value::Inner(_) => "inner XML",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Properties> for Value {
    fn from(p: Properties) -> Self {
        Value::Properties(p)
    }
}

impl From<InnerXml> for Value {
    fn from(i: InnerXml) -> Self {
        Value::Inner(i)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// An instance of a compiled type
///
/// Fields are keyed by wire name. An absent key is an unset field; the
/// serialized order always comes from the type descriptor, not from the map.
/// Comments found directly inside the element are joined with `\n` into
/// `comment`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    type_name: String,
    fields: IndexMap<String, Value>,
    comment: String,
}

impl Record {
    /// Create an empty record of the named type
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// Registry name of the record's type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set a field by wire name
    pub fn set(&mut self, wire_name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(wire_name.into(), value.into());
    }

    /// Set a field, builder style
    pub fn with(mut self, wire_name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(wire_name, value);
        self
    }

    /// Get a field by wire name
    pub fn get(&self, wire_name: &str) -> Option<&Value> {
        self.fields.get(wire_name)
    }

    /// Get a mutable field by wire name
    pub fn get_mut(&mut self, wire_name: &str) -> Option<&mut Value> {
        self.fields.get_mut(wire_name)
    }

    /// Unset a field
    pub fn remove(&mut self, wire_name: &str) -> Option<Value> {
        self.fields.shift_remove(wire_name)
    }

    /// Set fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether no field is set and the comment is empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.comment.is_empty()
    }

    /// Get the comment slot
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Set the comment slot
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Set the comment slot, builder style
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Append a comment body to the slot, newline separated
    pub(crate) fn push_comment(&mut self, body: &str) {
        if body.is_empty() {
            return;
        }
        if !self.comment.is_empty() {
            self.comment.push('\n');
        }
        self.comment.push_str(body);
    }
}
