//! Raw editing: the whole logic object as editable JSON text.

use serde_json::{Map, Value};

use crate::schema::LogicSpec;

/// Why raw logic text cannot be turned back into a logic object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RawLogicError {
    #[error("Raw logic must not be empty.")]
    Empty,

    #[error("Raw logic must be valid JSON ({0}).")]
    Syntax(String),

    #[error("Raw logic must describe an object.")]
    NotAnObject,

    #[error("Raw logic requires a type property.")]
    MissingType,
}

/// Parse raw logic text.
///
/// The object is returned verbatim except that a missing or non-object
/// `parameters` becomes an empty mapping.
pub fn parse_logic(text: &str) -> Result<LogicSpec, RawLogicError> {
    if text.trim().is_empty() {
        return Err(RawLogicError::Empty);
    }
    let value: Value = serde_json::from_str(text).map_err(|e| RawLogicError::Syntax(e.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(RawLogicError::NotAnObject);
    };

    let logic_type = match object.shift_remove("type") {
        Some(Value::String(t)) if !t.trim().is_empty() => t,
        _ => return Err(RawLogicError::MissingType),
    };
    let parameters = match object.shift_remove("parameters") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    Ok(LogicSpec {
        logic_type,
        parameters,
        extra: object,
    })
}

/// Pretty-printed JSON for a logic object.
pub fn format_logic(logic: &LogicSpec) -> String {
    serde_json::to_string_pretty(&logic.to_value()).unwrap_or_else(|_| "{}".to_string())
}

/// Editable text of a logic object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLogicModel {
    text: String,
}

impl RawLogicModel {
    pub fn from_logic(logic: &LogicSpec) -> Self {
        Self {
            text: format_logic(logic),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn parse(&self) -> Result<LogicSpec, RawLogicError> {
        parse_logic(&self.text)
    }
}
