//! Conversion between plain JSON and Firestore's typed `Value` encoding.
//!
//! Integers travel as strings (`{"integerValue": "42"}`), timestamps decode
//! to their RFC 3339 text, and empty maps or arrays may omit their inner
//! `fields`/`values` member entirely.

use serde_json::{Map, Number, Value, json};

use crate::error::StoreError;

pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode(v)))
        .collect()
}

pub fn decode(value: &Value) -> Result<Value, StoreError> {
    let Some(obj) = value.as_object() else {
        return Err(malformed("expected a typed value object", value));
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Err(malformed("empty typed value", value));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed("booleanValue", inner)),
        "integerValue" => decode_integer(inner),
        "doubleValue" => Ok(decode_double(inner)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed(kind, inner)),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(items)) => items.iter().map(decode).collect::<Result<_, _>>()?,
                Some(other) => return Err(malformed("arrayValue.values", other)),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(Value::Object(fields)) => decode_fields(fields)?,
                Some(other) => return Err(malformed("mapValue.fields", other)),
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(StoreError::Malformed(format!("unknown value type {other}"))),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
    fields
        .iter()
        .map(|(k, v)| decode(v).map(|decoded| (k.clone(), decoded)))
        .collect()
}

fn decode_integer(inner: &Value) -> Result<Value, StoreError> {
    match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|_| malformed("integerValue", inner)),
        Value::Number(n) => Ok(Value::Number(n.clone())),
        _ => Err(malformed("integerValue", inner)),
    }
}

/// Non-finite doubles (sent as `"NaN"` or `"Infinity"`) have no JSON form
/// and become null.
fn decode_double(inner: &Value) -> Value {
    inner
        .as_f64()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

fn malformed(what: &str, value: &Value) -> StoreError {
    StoreError::Malformed(format!("{what}: {value}"))
}
