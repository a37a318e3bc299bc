//! Bridge between [`Record`] trees and JSON value trees
//!
//! Typed structs emitted by the declaration generator (de)serialize with wire
//! names as keys and the comment slot under `#comment`. Going through a
//! `serde_json::Value` lets any such struct meet the dynamic codec without
//! a dedicated XML serde backend.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value as JsonValue};

use super::values::{Record, Value};
use crate::compiler::{FieldShape, TypeDescriptor, TypeRef, TypeRegistry, COMMENT_KEY};
use crate::error::EncodeError;
use crate::schema::PrimitiveKind;

/// Convert a record tree into a JSON object tree
pub fn record_to_json(record: &Record) -> serde_json::Result<JsonValue> {
    let mut object = Map::new();
    object.insert(
        COMMENT_KEY.to_string(),
        JsonValue::String(record.comment().to_string()),
    );
    for (wire, value) in record.fields() {
        object.insert(wire.to_string(), value_to_json(value)?);
    }
    Ok(JsonValue::Object(object))
}

fn value_to_json(value: &Value) -> serde_json::Result<JsonValue> {
    Ok(match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::from(*i),
        // Decimal deserializes from strings without precision loss
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::Record(r) => record_to_json(r)?,
        Value::List(items) => JsonValue::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<serde_json::Result<Vec<_>>>()?,
        ),
        Value::Properties(p) => serde_json::to_value(p)?,
        Value::Inner(i) => serde_json::to_value(i)?,
    })
}

/// Build a record of the named type from a JSON object tree
///
/// Keys are looked up by wire name; missing keys and `null` leave the field
/// unset. Keys the type does not declare are ignored.
pub fn record_from_json(
    registry: &TypeRegistry,
    type_name: &str,
    json: &JsonValue,
) -> Result<Record, EncodeError> {
    let desc = registry
        .get(type_name)
        .ok_or_else(|| EncodeError::UnknownType {
            field: String::new(),
            type_name: type_name.to_string(),
        })?;
    from_object(registry, desc, json)
}

fn from_object(
    registry: &TypeRegistry,
    desc: &TypeDescriptor,
    json: &JsonValue,
) -> Result<Record, EncodeError> {
    let object = json
        .as_object()
        .ok_or_else(|| EncodeError::shape(desc.name.clone(), "a JSON object"))?;
    let mut record = Record::new(desc.name.clone());

    for field in &desc.fields {
        let wire = field.wire_name.as_str();
        let Some(json) = object.get(wire).filter(|v| !v.is_null()) else {
            continue;
        };

        let value = match &field.shape {
            FieldShape::Comment => {
                let comment = json
                    .as_str()
                    .ok_or_else(|| EncodeError::shape(COMMENT_KEY, "a string"))?;
                record.set_comment(comment);
                continue;
            }
            FieldShape::Untyped => continue,
            FieldShape::Scalar { target } | FieldShape::OptionalScalar { target } => {
                value_from_json(registry, wire, target, json)?
            }
            FieldShape::ListWrapperReference { wrapper } => {
                let wrapper = lookup(registry, wire, wrapper)?;
                Value::Record(from_object(registry, wrapper, json)?)
            }
            FieldShape::OrderedBagReference => Value::Properties(serde_json::from_value(json.clone())?),
            FieldShape::OpaqueReference => Value::Inner(serde_json::from_value(json.clone())?),
            FieldShape::List { item } => {
                let items = json
                    .as_array()
                    .ok_or_else(|| EncodeError::shape(wire, "a JSON array"))?;
                Value::List(
                    items
                        .iter()
                        .map(|j| value_from_json(registry, wire, item, j))
                        .collect::<Result<Vec<_>, _>>()?,
                )
            }
        };
        record.set(wire, value);
    }
    Ok(record)
}

fn value_from_json(
    registry: &TypeRegistry,
    wire: &str,
    target: &TypeRef,
    json: &JsonValue,
) -> Result<Value, EncodeError> {
    let kind = match target {
        TypeRef::Complex(name) => {
            let desc = lookup(registry, wire, name)?;
            return Ok(Value::Record(from_object(registry, desc, json)?));
        }
        TypeRef::Primitive(kind) => *kind,
    };

    let value = match (kind, json) {
        (PrimitiveKind::String, JsonValue::String(s)) => Some(Value::String(s.clone())),
        (PrimitiveKind::Boolean, JsonValue::Bool(b)) => Some(Value::Boolean(*b)),
        (PrimitiveKind::Integer, JsonValue::Number(n)) => n.as_i64().map(Value::Integer),
        (PrimitiveKind::Decimal, JsonValue::String(s)) => parse_decimal(s).map(Value::Decimal),
        (PrimitiveKind::Decimal, JsonValue::Number(n)) => {
            parse_decimal(&n.to_string()).map(Value::Decimal)
        }
        _ => None,
    };
    value.ok_or_else(|| EncodeError::shape(wire, format!("a {} value", kind)))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn lookup<'r>(
    registry: &'r TypeRegistry,
    field: &str,
    type_name: &str,
) -> Result<&'r TypeDescriptor, EncodeError> {
    registry
        .get(type_name)
        .ok_or_else(|| EncodeError::UnknownType {
            field: field.to_string(),
            type_name: type_name.to_string(),
        })
}
