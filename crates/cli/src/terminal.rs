use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use alertdesk_rules::editor::{DefinitionEditor, Feedback, LogicEditor};
use alertdesk_rules::form::{display_text, FieldInput, FormLayout};
use alertdesk_rules::schema::AlertDefinition;
use alertdesk_rules::{BlueprintCatalog, Confirmer};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const PROMPT: Color = Color::Green;
    const NOTICE: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

/// Terminal rendering for definitions, blueprints and the editor.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the definition listing.
    pub fn print_definitions(&self, definitions: &[AlertDefinition]) -> Result<()> {
        let mut stdout = io::stdout();
        if definitions.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No alert definitions configured.\n"),
                ResetColor,
            )?;
            return Ok(());
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("Alert Definitions:\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("{:<24} {:<36} {:<8} {:<28}\n", "ID", "NAME", "STATUS", "LOGIC")),
            Print(format!("{}\n", "-".repeat(98))),
            ResetColor,
        )?;

        for d in definitions {
            let status = if d.enabled { "enabled" } else { "disabled" };
            let logic = if d.logic.logic_type.is_empty() {
                "(none)".to_string()
            } else {
                d.logic.logic_type.clone()
            };
            execute!(
                stdout,
                Print(format!(
                    "{:<24} {:<36} {:<8} {:<28}\n",
                    truncate(&d.id, 24),
                    truncate(&d.name, 36),
                    status,
                    truncate(&logic, 28),
                )),
            )?;
        }

        stdout.flush()?;
        Ok(())
    }

    /// Print the blueprints the structured editor offers, plus unrenderable ones.
    pub fn print_blueprints(&self, catalog: &BlueprintCatalog) -> Result<()> {
        let mut stdout = io::stdout();
        if catalog.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No alert blueprints available.\n"),
                ResetColor,
            )?;
            return Ok(());
        }

        execute!(stdout, SetForegroundColor(Colors::HEADER), Print("Blueprints:\n"), ResetColor)?;
        for blueprint in catalog.options() {
            execute!(stdout, Print(format!("  {:<28} {}\n", blueprint.id, blueprint.label)))?;
            if !blueprint.description.is_empty() {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("  {:<28} {}\n", "", blueprint.description)),
                    ResetColor,
                )?;
            }
            for (name, schema) in &blueprint.parameters {
                let default = schema
                    .default
                    .as_ref()
                    .map(|v| format!(" (default {})", display_text(v)))
                    .unwrap_or_default();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("  {:<28}   {name}: {}{default}\n", "", schema.kind)),
                    ResetColor,
                )?;
            }
        }
        for (id, reason) in catalog.unrenderable() {
            execute!(
                stdout,
                SetForegroundColor(Colors::NOTICE),
                Print(format!("  {:<28} raw JSON only: {reason}\n", id)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print the editor's working copy: header fields, then fields or raw JSON.
    pub fn print_editor(&self, editor: &DefinitionEditor) -> Result<()> {
        let mut stdout = io::stdout();
        let status = if editor.enabled() { "enabled" } else { "disabled" };
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{} ({})\n", editor.name(), editor.id())),
            ResetColor,
            Print(format!("  status:      {status}\n")),
        )?;
        if !editor.description().is_empty() {
            execute!(stdout, Print(format!("  description: {}\n", editor.description())))?;
        }
        if let Some(notice) = editor.notice() {
            execute!(
                stdout,
                SetForegroundColor(Colors::NOTICE),
                Print(format!("  {notice}\n")),
                ResetColor,
            )?;
        }

        match editor.logic() {
            LogicEditor::Raw(raw) => {
                execute!(stdout, Print("  logic (raw JSON):\n"))?;
                for line in raw.text().lines() {
                    execute!(stdout, Print(format!("    {line}\n")))?;
                }
            }
            LogicEditor::Structured(None) => {
                execute!(stdout, Print("  logic: (no blueprint selected)\n"))?;
            }
            LogicEditor::Structured(Some(form)) => {
                execute!(stdout, Print(format!("  logic: {}\n", form.blueprint().label)))?;
                match form.layout() {
                    FormLayout::NoParameters => {
                        execute!(
                            stdout,
                            SetForegroundColor(Colors::DIM),
                            Print("    This blueprint does not require additional parameters.\n"),
                            ResetColor,
                        )?;
                    }
                    FormLayout::Fields(fields) => {
                        for field in fields {
                            let shown = match (&field.placeholder, field.text.is_empty()) {
                                (Some(placeholder), true) => format!("({placeholder})"),
                                _ => field.text.clone(),
                            };
                            let hint = match &field.input {
                                FieldInput::Select { options } => {
                                    let values: Vec<&str> =
                                        options.iter().map(|o| o.value.as_str()).collect();
                                    format!(" [{}]", values.join("|"))
                                }
                                FieldInput::Number { min: Some(min) } => format!(" [>= {min}]"),
                                FieldInput::Number { min: None } | FieldInput::Text => String::new(),
                            };
                            execute!(
                                stdout,
                                Print(format!("    {:<20} {shown}", field.label)),
                                SetForegroundColor(Colors::DIM),
                                Print(format!("{hint}\n")),
                                ResetColor,
                            )?;
                        }
                    }
                }
            }
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print editor feedback in the matching color.
    pub fn print_feedback(&self, feedback: &Feedback) -> Result<()> {
        if feedback.is_error {
            self.print_error(&feedback.message)
        } else {
            self.print_info(&feedback.message)
        }
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stderr.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Asks on stdin. Anything but `y`/`yes` declines.
pub struct PromptConfirmer;

impl PromptConfirmer {
    fn ask(prompt: &str) -> io::Result<bool> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::PROMPT),
            Print(format!("{prompt} [y/N] ")),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let trimmed = input.trim().to_lowercase();
        Ok(trimmed == "y" || trimmed == "yes")
    }
}

impl Confirmer for PromptConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        Self::ask(prompt).unwrap_or(false)
    }
}
