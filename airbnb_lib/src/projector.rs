//! Schema-driven projection of the embedded page state.
//!
//! Pipelines apply the three operations in order: [`clean`], then
//! [`pick_by_schema`], then [`flatten_arrays_in_object`]. Each one is
//! idempotent and accepts any JSON value.

use serde_json::{Map, Value};

use crate::schema::{Schema, SchemaRule};

/// GraphQL type tags carried by every node of the page state.
const TYPENAME_KEY: &str = "__typename";

/// Removes object keys whose value is null, an empty array or an empty
/// object, along with `__typename` tags.
///
/// Children are cleaned before their parent decides whether they are
/// empty, so one pass reaches a fixed point. Array elements are cleaned but
/// never removed.
pub fn clean(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                clean(child);
            }
            map.retain(|key, child| key != TYPENAME_KEY && !is_vacant(child));
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                clean(item);
            }
        }
        _ => {}
    }
}

fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Keeps only the keys named by `schema`.
///
/// A nested rule is applied to each element when the value under that key
/// is an array, so the same schema serves fields the site sometimes wraps
/// in a single-element array and sometimes does not. Scalars pass through.
pub fn pick_by_schema(value: &Value, schema: &Schema) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| pick_by_schema(item, schema))
                .collect(),
        ),
        Value::Object(map) => {
            let mut picked = Map::new();
            for (key, rule) in schema.iter() {
                let Some(child) = map.get(key) else {
                    continue;
                };
                let kept = match rule {
                    SchemaRule::Keep => child.clone(),
                    SchemaRule::Nested(nested) => pick_by_schema(child, nested),
                };
                picked.insert(key.clone(), kept);
            }
            Value::Object(picked)
        }
        other => other.clone(),
    }
}

/// Unwraps single-element arrays found as object field values.
///
/// Unwrapping repeats until the field holds something other than a
/// one-element array, and the result is flattened in turn. Arrays of any
/// other length stay arrays with flattened elements.
pub fn flatten_arrays_in_object(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), flatten_field(child)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(flatten_arrays_in_object).collect()),
        other => other.clone(),
    }
}

fn flatten_field(value: &Value) -> Value {
    let mut current = value;
    loop {
        match current {
            Value::Array(items) if items.len() == 1 => current = &items[0],
            _ => break,
        }
    }
    flatten_arrays_in_object(current)
}

/// clean -> pick -> flatten in one call.
pub fn project(value: &Value, schema: &Schema) -> Value {
    let mut cleaned = value.clone();
    clean(&mut cleaned);
    flatten_arrays_in_object(&pick_by_schema(&cleaned, schema))
}
