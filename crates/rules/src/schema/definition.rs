//! Alert definitions and the listing payload served by the definition service.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::BlueprintSpec;

pub(crate) fn default_true() -> bool {
    true
}

/// Treats `null` like an absent string.
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything other than a JSON object becomes an empty parameter map.
fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// The logic a definition runs: a blueprint reference plus parameter values.
///
/// Keys other than `type` and `parameters` (hand-authored logic) are kept in
/// `extra` and serialized back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicSpec {
    #[serde(rename = "type", default, deserialize_with = "string_or_null")]
    pub logic_type: String,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub parameters: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogicSpec {
    pub fn new(logic_type: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            logic_type: logic_type.into(),
            parameters,
            extra: Map::new(),
        }
    }

    /// The logic as a single JSON object, `type` first.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::String(self.logic_type.clone()));
        object.insert("parameters".to_string(), Value::Object(self.parameters.clone()));
        for (key, value) in &self.extra {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// A persisted alert definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDefinition {
    pub id: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub logic: LogicSpec,
}

/// Full snapshot returned by `GET /definitions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionListing {
    #[serde(default)]
    pub definitions: Vec<AlertDefinition>,
    #[serde(default)]
    pub blueprints: IndexMap<String, BlueprintSpec>,
}

/// Identifiers end up in URL paths, so they are limited to `[A-Za-z0-9_.-]`.
pub fn is_url_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
