//! Parameter schemas: the typed description of one configurable blueprint field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One `{value, label}` entry of a select parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: Some(label.into()),
        }
    }

    /// Label shown to the user, falling back to the raw value.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// Closed set of parameter kinds. Every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    String,
    Number,
    Select(Vec<SelectOption>),
}

impl ParameterKind {
    /// Wire tag used in the `type` field.
    pub fn tag(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Number => "number",
            ParameterKind::Select(_) => "select",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Wire form of a parameter schema as served by the definition service.
///
/// Kept loose on purpose so that a catalog containing one malformed schema
/// still deserializes; [`ParameterSchema::try_from`] does the validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
}

impl ParameterSpec {
    pub fn number() -> Self {
        Self {
            kind: Some("number".to_string()),
            ..Default::default()
        }
    }

    pub fn string() -> Self {
        Self {
            kind: Some("string".to_string()),
            ..Default::default()
        }
    }

    pub fn select(options: Vec<SelectOption>) -> Self {
        Self {
            kind: Some("select".to_string()),
            options: Some(options),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }
}

/// Why a [`ParameterSpec`] cannot be rendered as a structured field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("parameter '{name}' is a select without options")]
    SelectWithoutOptions { name: String },

    #[error("parameter '{name}' has unsupported type '{tag}'")]
    UnsupportedType { name: String, tag: String },
}

/// Validated schema of one blueprint parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    pub kind: ParameterKind,
    pub label: Option<String>,
    pub help: Option<String>,
    pub default: Option<Value>,
    /// Advisory lower bound, only used as an input hint.
    pub min: Option<f64>,
}

impl ParameterSchema {
    /// Validate a wire spec. A missing `type` means `string`.
    pub fn from_spec(name: &str, spec: &ParameterSpec) -> Result<Self, SchemaError> {
        let kind = match spec.kind.as_deref() {
            None | Some("string") => ParameterKind::String,
            Some("number") => ParameterKind::Number,
            Some("select") => match &spec.options {
                Some(options) if !options.is_empty() => ParameterKind::Select(options.clone()),
                _ => {
                    return Err(SchemaError::SelectWithoutOptions {
                        name: name.to_string(),
                    })
                }
            },
            Some(other) => {
                return Err(SchemaError::UnsupportedType {
                    name: name.to_string(),
                    tag: other.to_string(),
                })
            }
        };

        Ok(Self {
            kind,
            label: spec.label.clone(),
            help: spec.help.clone(),
            default: spec.default.clone(),
            min: spec.min,
        })
    }

    /// Convert back to the wire form.
    pub fn to_spec(&self) -> ParameterSpec {
        ParameterSpec {
            kind: Some(self.kind.tag().to_string()),
            label: self.label.clone(),
            help: self.help.clone(),
            default: self.default.clone(),
            options: match &self.kind {
                ParameterKind::Select(options) => Some(options.clone()),
                ParameterKind::String | ParameterKind::Number => None,
            },
            min: self.min,
        }
    }
}
