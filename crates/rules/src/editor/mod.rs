//! Definition editor state machine.
//!
//! States are `{Create, Edit(id)} x {Structured, Raw}`. Exactly one of the
//! form model and the raw model is authoritative at any time; the other is
//! derived from it on toggle and never edited while inactive.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{BlueprintCatalog, Lookup};
use crate::error::{EditorError, Result};
use crate::form::ParameterFormModel;
use crate::raw::RawLogicModel;
use crate::schema::{is_url_safe_id, AlertDefinition, Blueprint, LogicSpec};


/// Whether the editor is creating a definition or editing a stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(String),
}

/// The authoritative logic model of the working copy.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicEditor {
    /// Per-parameter fields; `None` when no blueprint is selected.
    Structured(Option<ParameterFormModel>),
    Raw(RawLogicModel),
}

/// Status line shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    pub is_error: bool,
}

impl Feedback {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// One entry of the blueprint selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    pub id: String,
    pub label: String,
    /// Synthetic entry for a logic type the catalog does not describe.
    pub custom: bool,
}

/// Working copy of at most one definition plus its editing mode.
#[derive(Debug, Clone)]
pub struct DefinitionEditor {
    catalog: Arc<BlueprintCatalog>,
    mode: EditorMode,
    id: String,
    name: String,
    description: String,
    enabled: bool,
    logic: LogicEditor,
    custom_types: Vec<String>,
    /// Set while the blueprint selector is locked, explains why.
    notice: Option<String>,
    feedback: Option<Feedback>,
}

impl DefinitionEditor {
    /// Editor in its idle state: `Create x Structured`.
    pub fn new(catalog: Arc<BlueprintCatalog>) -> Self {
        let mut editor = Self {
            catalog,
            mode: EditorMode::Create,
            id: String::new(),
            name: String::new(),
            description: String::new(),
            enabled: true,
            logic: LogicEditor::Structured(None),
            custom_types: Vec::new(),
            notice: None,
            feedback: None,
        };
        editor.start_new();
        editor
    }

    /// Swap in a freshly loaded catalog. The working copy is left alone.
    pub fn set_catalog(&mut self, catalog: Arc<BlueprintCatalog>) {
        self.catalog = catalog;
    }

    pub fn catalog(&self) -> &BlueprintCatalog {
        &self.catalog
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// Reset to `Create x Structured` with the first blueprint (by label) selected.
    pub fn start_new(&mut self) {
        self.mode = EditorMode::Create;
        self.id.clear();
        self.name.clear();
        self.description.clear();
        self.enabled = true;
        self.custom_types.clear();
        self.notice = None;
        self.feedback = None;
        self.logic = LogicEditor::Structured(self.catalog.first().cloned().map(ParameterFormModel::new));
        debug!("editor reset to create");
    }

    /// Load a stored definition into the working copy.
    ///
    /// Renderable logic types open as structured fields. Anything else opens
    /// as raw JSON with the blueprint selector locked.
    pub fn select(&mut self, definition: &AlertDefinition) {
        self.mode = EditorMode::Edit(definition.id.clone());
        self.id = definition.id.clone();
        self.name = definition.name.clone();
        self.description = definition.description.clone();
        self.enabled = definition.enabled;
        self.custom_types.clear();
        self.feedback = None;

        let logic = &definition.logic;
        let notice = match self.catalog.lookup(&logic.logic_type) {
            Lookup::Renderable(blueprint) if logic.extra.is_empty() => {
                self.logic = LogicEditor::Structured(Some(ParameterFormModel::from_parameters(
                    blueprint.clone(),
                    &logic.parameters,
                )));
                None
            }
            Lookup::Renderable(_) => Some(format!(
                "Logic '{}' carries properties besides its parameters; edit it as raw JSON.",
                logic.logic_type
            )),
            Lookup::Unrenderable { reason } => Some(format!(
                "Blueprint '{}' cannot be edited as fields ({reason}); edit it as raw JSON.",
                logic.logic_type
            )),
            Lookup::Unknown => Some(format!(
                "Logic type '{}' is not in the blueprint catalog; edit it as raw JSON.",
                logic.logic_type
            )),
        };

        if notice.is_some() {
            self.logic = LogicEditor::Raw(RawLogicModel::from_logic(logic));
        }
        debug!(definition_id = %definition.id, raw = notice.is_some(), "editor loaded definition");
        self.notice = notice;
    }

    /// Pick a blueprint in structured mode. Always discards the current field values.
    pub fn choose_blueprint(&mut self, blueprint_id: &str) -> Result<()> {
        if let Some(notice) = &self.notice {
            return Err(EditorError::validation(notice.clone()));
        }
        if self.is_raw() {
            return Err(EditorError::validation(
                "Switch back to structured fields before choosing a blueprint.",
            ));
        }
        let blueprint = self.resolve_blueprint(blueprint_id).ok_or_else(|| {
            EditorError::validation(format!("Unknown blueprint '{blueprint_id}'."))
        })?;
        self.logic = LogicEditor::Structured(Some(ParameterFormModel::new(blueprint)));
        Ok(())
    }

    fn resolve_blueprint(&self, blueprint_id: &str) -> Option<Blueprint> {
        if let Some(blueprint) = self.catalog.get(blueprint_id) {
            return Some(blueprint.clone());
        }
        self.custom_types
            .iter()
            .any(|t| t == blueprint_id)
            .then(|| Blueprint::custom(blueprint_id))
    }

    /// Switch between structured fields and raw JSON.
    ///
    /// Turning raw on serializes the current fields without validation.
    /// Turning raw off parses the text first; on failure the editor stays in
    /// raw mode and the error is also recorded as feedback.
    pub fn toggle_raw(&mut self, enable: bool) -> Result<()> {
        if enable {
            if let LogicEditor::Structured(form) = &self.logic {
                let logic = form.as_ref().map(|f| f.to_logic()).unwrap_or_default();
                self.logic = LogicEditor::Raw(RawLogicModel::from_logic(&logic));
                debug!("editor switched to raw");
            }
            return Ok(());
        }

        let raw = match &self.logic {
            LogicEditor::Raw(raw) => raw.clone(),
            LogicEditor::Structured(_) => return Ok(()),
        };
        match self.leave_raw(&raw) {
            Ok(form) => {
                self.logic = LogicEditor::Structured(Some(form));
                self.notice = None;
                self.feedback = None;
                debug!("editor switched to structured");
                Ok(())
            }
            Err(e) => {
                self.feedback = Some(Feedback::error(e.to_string()));
                Err(e)
            }
        }
    }

    fn leave_raw(&mut self, raw: &RawLogicModel) -> Result<ParameterFormModel> {
        let logic = raw.parse()?;
        if !logic.extra.is_empty() {
            let keys: Vec<&str> = logic.extra.keys().map(|k| k.as_str()).collect();
            return Err(EditorError::validation(format!(
                "Raw logic has properties fields cannot hold ({}); keep editing it as raw JSON.",
                keys.join(", ")
            )));
        }
        let blueprint = match self.catalog.get(&logic.logic_type) {
            Some(blueprint) => blueprint.clone(),
            None => {
                if !self.custom_types.contains(&logic.logic_type) {
                    self.custom_types.push(logic.logic_type.clone());
                }
                Blueprint::custom(&logic.logic_type)
            }
        };
        Ok(ParameterFormModel::from_parameters(blueprint, &logic.parameters))
    }

    // ── Edits ───────────────────────────────────────────────────────

    /// Set the identifier. Only allowed while creating.
    pub fn set_id(&mut self, id: impl Into<String>) -> Result<()> {
        if let EditorMode::Edit(current) = &self.mode {
            return Err(EditorError::validation(format!(
                "The identifier of '{current}' cannot be changed; create a new definition instead."
            )));
        }
        self.id = id.into();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Edit one structured field.
    pub fn set_field(&mut self, name: &str, value: impl Into<serde_json::Value>) -> Result<()> {
        self.form_mut()?.set_field(name, value);
        Ok(())
    }

    pub fn clear_field(&mut self, name: &str) -> Result<()> {
        self.form_mut()?.clear_field(name);
        Ok(())
    }

    fn form_mut(&mut self) -> Result<&mut ParameterFormModel> {
        match &mut self.logic {
            LogicEditor::Structured(Some(form)) => Ok(form),
            LogicEditor::Structured(None) => {
                Err(EditorError::validation("Select a logic blueprint for the alert."))
            }
            LogicEditor::Raw(_) => Err(EditorError::validation(
                "Fields are not editable while raw editing is on.",
            )),
        }
    }

    /// Replace the raw JSON text.
    pub fn set_raw_text(&mut self, text: impl Into<String>) -> Result<()> {
        match &mut self.logic {
            LogicEditor::Raw(raw) => {
                raw.set_text(text);
                Ok(())
            }
            LogicEditor::Structured(_) => Err(EditorError::validation(
                "Turn on raw editing before editing the logic as JSON.",
            )),
        }
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Build the canonical payload from the working copy.
    ///
    /// Never touches the backend; the first validation failure is returned.
    pub fn build_payload(&self) -> Result<AlertDefinition> {
        let id = match &self.mode {
            EditorMode::Edit(id) => id.clone(),
            EditorMode::Create => self.id.trim().to_string(),
        };
        let name = self.name.trim();
        if id.is_empty() || name.is_empty() {
            return Err(EditorError::validation("Identifier and name are required."));
        }
        if !is_url_safe_id(&id) {
            return Err(EditorError::validation(
                "Identifier may only contain letters, digits, '-', '_' and '.'.",
            ));
        }

        Ok(AlertDefinition {
            id,
            name: name.to_string(),
            description: self.description.trim().to_string(),
            enabled: self.enabled,
            logic: self.current_logic()?,
        })
    }

    /// Logic as it would be submitted right now.
    pub fn current_logic(&self) -> Result<LogicSpec> {
        match &self.logic {
            LogicEditor::Raw(raw) => Ok(raw.parse()?),
            LogicEditor::Structured(Some(form)) => Ok(form.to_logic()),
            LogicEditor::Structured(None) => {
                Err(EditorError::validation("Select a logic blueprint for the alert."))
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    /// Id of the definition a delete would target.
    pub fn delete_target(&self) -> Option<&str> {
        match &self.mode {
            EditorMode::Edit(id) => Some(id),
            EditorMode::Create => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.logic, LogicEditor::Raw(_))
    }

    pub fn logic(&self) -> &LogicEditor {
        &self.logic
    }

    pub fn form(&self) -> Option<&ParameterFormModel> {
        match &self.logic {
            LogicEditor::Structured(form) => form.as_ref(),
            LogicEditor::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&RawLogicModel> {
        match &self.logic {
            LogicEditor::Raw(raw) => Some(raw),
            LogicEditor::Structured(_) => None,
        }
    }

    pub fn selected_blueprint(&self) -> Option<&str> {
        self.form().map(|f| f.blueprint().id.as_str())
    }

    pub fn blueprint_locked(&self) -> bool {
        self.notice.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn set_feedback(&mut self, feedback: Feedback) {
        self.feedback = Some(feedback);
    }

    pub fn clear_feedback(&mut self) {
        self.feedback = None;
    }

    /// Catalog blueprints sorted by label, then registered custom types.
    pub fn selector_entries(&self) -> Vec<SelectorEntry> {
        let mut entries: Vec<SelectorEntry> = self
            .catalog
            .options()
            .into_iter()
            .map(|b| SelectorEntry {
                id: b.id.clone(),
                label: b.label.clone(),
                custom: false,
            })
            .collect();
        entries.extend(self.custom_types.iter().map(|t| SelectorEntry {
            id: t.clone(),
            label: Blueprint::custom(t).label,
            custom: true,
        }));
        entries
    }
}
