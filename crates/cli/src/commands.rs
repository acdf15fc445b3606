use std::fs;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use alertdesk_rules::editor::DefinitionEditor;
use alertdesk_rules::{ConfigSession, Confirmer, DeleteOutcome};

use crate::cli::{parse_assignment, Command, CreateArgs, LogicArgs, UpdateArgs};
use crate::terminal::{PromptConfirmer, Terminal};

/// Run one subcommand against a session.
pub async fn run(command: Command, session: &mut ConfigSession, terminal: &Terminal) -> Result<()> {
    session.load().await?;

    match command {
        Command::List => terminal.print_definitions(&session.collection().definitions()),
        Command::Blueprints => terminal.print_blueprints(&session.collection().catalog()),
        Command::Show { id, raw } => {
            session.select(&id)?;
            if raw {
                session.toggle_raw(true)?;
            }
            terminal.print_editor(session.editor())
        }
        Command::Create(args) => {
            create(session, args).await?;
            report(session, terminal)
        }
        Command::Update(args) => {
            update(session, args).await?;
            report(session, terminal)
        }
        Command::Delete { id, yes } => {
            session.select(&id)?;
            let assume_yes = |_: &str| true;
            let confirmer: &dyn Confirmer = if yes { &assume_yes } else { &PromptConfirmer };
            match session.delete(confirmer).await? {
                DeleteOutcome::Deleted => report(session, terminal),
                DeleteOutcome::Declined => terminal.print_info("Delete cancelled."),
            }
        }
    }
}

fn report(session: &ConfigSession, terminal: &Terminal) -> Result<()> {
    if let Some(feedback) = session.editor().feedback() {
        terminal.print_feedback(feedback)?;
    }
    Ok(())
}

async fn create(session: &mut ConfigSession, args: CreateArgs) -> Result<()> {
    session.start_new();
    let editor = session.editor_mut();
    let id = args.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    editor.set_id(id)?;
    editor.set_name(args.name);
    if let Some(description) = args.description {
        editor.set_description(description);
    }
    editor.set_enabled(!args.disabled);
    apply_logic(editor, &args.logic)?;

    let saved = session.submit().await?;
    info!(definition_id = %saved.id, "definition created from command line");
    Ok(())
}

async fn update(session: &mut ConfigSession, args: UpdateArgs) -> Result<()> {
    session.select(&args.id)?;
    let editor = session.editor_mut();
    if let Some(name) = args.name {
        editor.set_name(name);
    }
    if let Some(description) = args.description {
        editor.set_description(description);
    }
    if args.enable {
        editor.set_enabled(true);
    } else if args.disable {
        editor.set_enabled(false);
    }
    apply_logic(editor, &args.logic)?;

    session.submit().await?;
    Ok(())
}

/// Apply logic flags to the working copy: raw text, or blueprint then fields.
fn apply_logic(editor: &mut DefinitionEditor, args: &LogicArgs) -> Result<()> {
    if let Some(path) = &args.raw_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read logic file '{}'", path.display()))?;
        editor.toggle_raw(true)?;
        editor.set_raw_text(text)?;
        return Ok(());
    }

    if let Some(blueprint) = &args.blueprint {
        editor.choose_blueprint(blueprint)?;
    }
    for assignment in &args.set {
        let Some((name, value)) = parse_assignment(assignment) else {
            bail!("invalid --set '{assignment}', expected NAME=VALUE");
        };
        // Field input is text; number coercion happens when the preview is built.
        editor.set_field(name, Value::String(value.to_string()))?;
    }
    for name in &args.unset {
        editor.clear_field(name)?;
    }
    Ok(())
}
