//! Logic blueprints: named parameter templates a definition can be built from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{ParameterSchema, ParameterSpec, SchemaError};

/// Wire form of a blueprint. The id is the key of the enclosing catalog map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintSpec {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Parameter schemas in declaration order.
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterSpec>,
}

impl BlueprintSpec {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            description: Some(description.into()),
            parameters: IndexMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }
}

/// A validated, renderable blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub id: String,
    pub label: String,
    pub description: String,
    pub parameters: IndexMap<String, ParameterSchema>,
    /// Synthetic entry for a logic type no catalog blueprint describes.
    pub custom: bool,
}

impl Blueprint {
    /// Validate every parameter of a wire blueprint. The label falls back to the id.
    pub fn from_spec(id: &str, spec: &BlueprintSpec) -> Result<Self, SchemaError> {
        let mut parameters = IndexMap::with_capacity(spec.parameters.len());
        for (name, param) in &spec.parameters {
            parameters.insert(name.clone(), ParameterSchema::from_spec(name, param)?);
        }
        Ok(Self {
            id: id.to_string(),
            label: spec
                .label
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| id.to_string()),
            description: spec.description.clone().unwrap_or_default(),
            parameters,
            custom: false,
        })
    }

    /// Blueprint with no declared parameters standing in for an unknown logic type.
    ///
    /// Every parameter of a definition using it is treated as a pass-through field.
    pub fn custom(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: format!("{id} (custom)"),
            description: String::new(),
            parameters: IndexMap::new(),
            custom: true,
        }
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    pub fn to_spec(&self) -> BlueprintSpec {
        BlueprintSpec {
            label: Some(self.label.clone()),
            description: Some(self.description.clone()),
            parameters: self
                .parameters
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_spec()))
                .collect(),
        }
    }
}
