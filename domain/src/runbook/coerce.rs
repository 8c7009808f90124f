//! Provider result coercion.
//!
//! Provider methods return values of many shapes: typed records, lists of
//! records, bare mappings, scalars, or nothing. Dispatch serializes the
//! typed value to JSON first, then [`to_result_map`] normalizes the JSON
//! into the mapping form stored on actions and step results.

use serde_json::{Map, Value};

/// Normalize a provider return value into a result mapping.
///
/// - null → empty mapping
/// - mapping → as-is (typed records arrive here already serialized)
/// - list → `{"items": […], "count": N}` with each element itself coerced
/// - scalar → `{"value": "<stringified>"}`
pub fn to_result_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        Value::Array(items) => {
            let coerced: Vec<Value> = items.into_iter().map(coerce_element).collect();
            let count = coerced.len() as u64;
            let mut map = Map::new();
            map.insert("items".to_string(), Value::Array(coerced));
            map.insert("count".to_string(), Value::from(count));
            map
        }
        scalar => {
            let mut map = Map::new();
            map.insert("value".to_string(), Value::String(stringify(&scalar)));
            map
        }
    }
}

fn coerce_element(item: Value) -> Value {
    match item {
        Value::Object(_) => item,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), Value::String(stringify(&other)));
            Value::Object(map)
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
