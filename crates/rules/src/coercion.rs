//! Value coercion and merge-with-defaults.
//!
//! Raw editable values are JSON values: text typed into a field arrives as a
//! string, values seeded from a stored definition keep their stored type.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::schema::{Blueprint, ParameterKind, ParameterSchema};

/// Whether a raw value counts as "no override".
pub fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Coerce a raw value into the schema's type.
///
/// Returns `None` for a blank value, which is the signal that defaulting applies.
/// A number field holding text that does not parse keeps the text unchanged:
/// the user may be mid-edit and the value must not be silently dropped.
pub fn coerce(schema: Option<&ParameterSchema>, raw: &Value) -> Option<Value> {
    if is_blank(raw) {
        return None;
    }
    let Some(schema) = schema else {
        return Some(raw.clone());
    };
    match &schema.kind {
        ParameterKind::Number => Some(match raw {
            Value::String(text) => parse_number(text).unwrap_or_else(|| raw.clone()),
            other => other.clone(),
        }),
        ParameterKind::String | ParameterKind::Select(_) => Some(raw.clone()),
    }
}

/// Integer first so `"5"` stays `5` rather than `5.0`; non-finite floats are rejected.
fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Produce the effective parameter set of a definition.
///
/// Declared keys come first in schema order: a non-blank override is coerced,
/// otherwise the schema default is used, otherwise the key is omitted. Keys the
/// blueprint does not declare follow in first-encountered order, unchanged,
/// when non-blank.
pub fn merge_with_defaults(blueprint: &Blueprint, raw_values: &IndexMap<String, Value>) -> Map<String, Value> {
    let mut merged = Map::new();

    for (name, schema) in &blueprint.parameters {
        let value = raw_values
            .get(name)
            .and_then(|raw| coerce(Some(schema), raw))
            .or_else(|| schema.default.clone());
        if let Some(value) = value {
            merged.insert(name.clone(), value);
        }
    }

    for (name, raw) in raw_values {
        if blueprint.parameters.contains_key(name) {
            continue;
        }
        if let Some(value) = coerce(None, raw) {
            merged.insert(name.clone(), value);
        }
    }

    merged
}
