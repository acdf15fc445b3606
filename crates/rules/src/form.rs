//! Structured editing: one field per blueprint parameter plus pass-through fields.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::coercion::merge_with_defaults;
use crate::schema::{Blueprint, LogicSpec, ParameterKind, SelectOption};

/// How a field should be presented.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Text,
    Number { min: Option<f64> },
    Select { options: Vec<SelectOption> },
}

/// Everything a renderer needs for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub help: Option<String>,
    pub input: FieldInput,
    /// Current value as editable text.
    pub text: String,
    /// Default shown when the field is left blank.
    pub placeholder: Option<String>,
    /// Not declared by the blueprint; kept and submitted unchanged.
    pub pass_through: bool,
}

/// What the form area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FormLayout {
    /// The blueprint declares no parameters and nothing else is carried.
    NoParameters,
    Fields(Vec<FieldView>),
}

/// Render a raw value as field text.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Field values for one blueprint with a live merged preview.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFormModel {
    blueprint: Blueprint,
    /// Declared parameters first (schema order), then pass-through keys.
    values: IndexMap<String, Value>,
    preview: Map<String, Value>,
}

impl ParameterFormModel {
    /// Fresh form for a new definition, seeded from the schema defaults.
    pub fn new(blueprint: Blueprint) -> Self {
        let values = blueprint
            .parameters
            .iter()
            .map(|(name, schema)| (name.clone(), schema.default.clone().unwrap_or(Value::Null)))
            .collect();
        Self::with_values(blueprint, values)
    }

    /// Form seeded from an existing definition's parameters.
    ///
    /// Parameters the blueprint does not declare become pass-through fields.
    pub fn from_parameters(blueprint: Blueprint, parameters: &Map<String, Value>) -> Self {
        let mut values: IndexMap<String, Value> = blueprint
            .parameters
            .keys()
            .map(|name| (name.clone(), parameters.get(name).cloned().unwrap_or(Value::Null)))
            .collect();
        for (name, value) in parameters {
            if !values.contains_key(name) {
                values.insert(name.clone(), value.clone());
            }
        }
        Self::with_values(blueprint, values)
    }

    fn with_values(blueprint: Blueprint, values: IndexMap<String, Value>) -> Self {
        let preview = merge_with_defaults(&blueprint, &values);
        Self {
            blueprint,
            values,
            preview,
        }
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    /// Set a field. Unknown names are added as pass-through fields.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
        self.refresh_preview();
    }

    /// Blank a declared field (its default applies again) or drop a pass-through field.
    pub fn clear_field(&mut self, name: &str) {
        if self.blueprint.parameters.contains_key(name) {
            self.values.insert(name.to_string(), Value::Null);
        } else {
            self.values.shift_remove(name);
        }
        self.refresh_preview();
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn raw_values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Effective parameters as they would be submitted.
    pub fn preview(&self) -> &Map<String, Value> {
        &self.preview
    }

    fn refresh_preview(&mut self) {
        self.preview = merge_with_defaults(&self.blueprint, &self.values);
    }

    /// Logic object for submission or for seeding raw mode.
    pub fn to_logic(&self) -> LogicSpec {
        LogicSpec::new(self.blueprint.id.clone(), self.preview.clone())
    }

    pub fn layout(&self) -> FormLayout {
        if self.values.is_empty() {
            return FormLayout::NoParameters;
        }
        FormLayout::Fields(self.field_views())
    }

    pub fn field_views(&self) -> Vec<FieldView> {
        self.values
            .iter()
            .map(|(name, value)| match self.blueprint.parameters.get(name) {
                Some(schema) => FieldView {
                    name: name.clone(),
                    label: schema.label.clone().unwrap_or_else(|| name.clone()),
                    help: schema.help.clone(),
                    input: match &schema.kind {
                        ParameterKind::String => FieldInput::Text,
                        ParameterKind::Number => FieldInput::Number { min: schema.min },
                        ParameterKind::Select(options) => FieldInput::Select {
                            options: options.clone(),
                        },
                    },
                    text: display_text(value),
                    placeholder: schema.default.as_ref().map(display_text),
                    pass_through: false,
                },
                None => FieldView {
                    name: name.clone(),
                    label: name.clone(),
                    help: None,
                    input: FieldInput::Text,
                    text: display_text(value),
                    placeholder: None,
                    pass_through: true,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BlueprintSpec, ParameterSpec};
    use serde_json::json;

    fn threshold() -> Blueprint {
        let spec = BlueprintSpec::new("Threshold", "")
            .with_parameter(
                "count",
                ParameterSpec::number().with_default(5).with_min(1.0).with_label("Count"),
            )
            .with_parameter("label", ParameterSpec::string());
        Blueprint::from_spec("threshold", &spec).unwrap()
    }

    #[test]
    fn new_form_previews_defaults_only() {
        let form = ParameterFormModel::new(threshold());
        assert_eq!(Value::Object(form.preview().clone()), json!({ "count": 5 }));
        assert_eq!(form.value("label"), Some(&Value::Null));
    }

    #[test]
    fn preview_tracks_edits() {
        let mut form = ParameterFormModel::new(threshold());
        form.set_field("count", "12");
        form.set_field("label", "night shift");
        assert_eq!(
            Value::Object(form.preview().clone()),
            json!({ "count": 12, "label": "night shift" })
        );

        form.clear_field("count");
        assert_eq!(form.preview()["count"], json!(5));
    }

    #[test]
    fn seeding_keeps_undeclared_parameters() {
        let params = json!({ "legacy_flag": true, "count": 8 });
        let form = ParameterFormModel::from_parameters(threshold(), params.as_object().unwrap());

        let names: Vec<&str> = form.raw_values().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["count", "label", "legacy_flag"]);
        assert_eq!(
            Value::Object(form.preview().clone()),
            json!({ "count": 8, "legacy_flag": true })
        );

        let views = form.field_views();
        assert!(views[2].pass_through);
        assert_eq!(views[2].text, "true");
    }

    #[test]
    fn clearing_pass_through_removes_it() {
        let params = json!({ "extra": "x" });
        let mut form = ParameterFormModel::from_parameters(threshold(), params.as_object().unwrap());
        form.clear_field("extra");
        assert!(form.value("extra").is_none());
        assert!(!form.preview().contains_key("extra"));
    }

    #[test]
    fn zero_parameter_blueprint_has_explicit_layout() {
        let blueprint = Blueprint::from_spec("missing_role", &BlueprintSpec::new("Missing role", "")).unwrap();
        let form = ParameterFormModel::new(blueprint);
        assert_eq!(form.layout(), FormLayout::NoParameters);
        assert!(form.preview().is_empty());
    }

    #[test]
    fn field_views_describe_inputs() {
        let form = ParameterFormModel::new(threshold());
        let FormLayout::Fields(views) = form.layout() else {
            panic!("expected fields");
        };
        assert_eq!(views[0].label, "Count");
        assert_eq!(views[0].input, FieldInput::Number { min: Some(1.0) });
        assert_eq!(views[0].text, "5");
        assert_eq!(views[0].placeholder.as_deref(), Some("5"));
        assert_eq!(views[1].label, "label");
        assert_eq!(views[1].text, "");
    }

    #[test]
    fn to_logic_uses_blueprint_id() {
        let form = ParameterFormModel::new(threshold());
        let logic = form.to_logic();
        assert_eq!(logic.logic_type, "threshold");
        assert_eq!(logic.parameters["count"], json!(5));
    }
}
