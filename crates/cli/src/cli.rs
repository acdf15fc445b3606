use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Manage alert definitions.
///
/// Works against the definition service when a server URL is configured,
/// otherwise against a local JSON file.
#[derive(Parser, Debug)]
#[command(name = "alertdesk", about = "Create, edit and delete alert definitions")]
pub struct CliArgs {
    /// Definition service base URL (overrides ALERTDESK_SERVER_URL)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Local definitions file used when no server is configured
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Request timeout in seconds for the definition service
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Config profile prefix (e.g. STAGING reads STAGING_ALERTDESK_SERVER_URL)
    #[arg(long, global = true, env = "ALERTDESK_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored alert definitions
    List,

    /// List blueprints available for structured editing
    Blueprints,

    /// Show one definition as the editor would present it
    Show {
        id: String,

        /// Show the logic as raw JSON even when it has fields
        #[arg(long)]
        raw: bool,
    },

    /// Create a new alert definition
    Create(CreateArgs),

    /// Update an existing alert definition
    Update(UpdateArgs),

    /// Delete an alert definition
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Logic edits shared by create and update.
#[derive(Args, Debug, Default)]
pub struct LogicArgs {
    /// Blueprint to use (discards existing parameter values)
    #[arg(long)]
    pub blueprint: Option<String>,

    /// Set a parameter, `name=value`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Clear a parameter so its default applies again. Repeatable.
    #[arg(long = "unset", value_name = "NAME")]
    pub unset: Vec<String>,

    /// Read the whole logic object as JSON from a file instead of using fields
    #[arg(long, conflicts_with_all = ["blueprint", "set", "unset"])]
    pub raw_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Identifier (letters, digits, '-', '_', '.'); generated when omitted
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Store the definition disabled
    #[arg(long)]
    pub disabled: bool,

    #[command(flatten)]
    pub logic: LogicArgs,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    #[arg(long)]
    pub disable: bool,

    #[command(flatten)]
    pub logic: LogicArgs,
}

/// Split `name=value`. The value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Option<(&str, &str)> {
    let (name, value) = raw.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(parse_assignment("min_count=3"), Some(("min_count", "3")));
        assert_eq!(parse_assignment("expr=a=b"), Some(("expr", "a=b")));
        assert_eq!(parse_assignment(" label =  "), Some(("label", "  ")));
        assert_eq!(parse_assignment("=3"), None);
        assert_eq!(parse_assignment("nothing"), None);
    }

    #[test]
    fn parses_create_with_repeated_sets() {
        let args = CliArgs::try_parse_from([
            "alertdesk",
            "--data-file",
            "defs.json",
            "create",
            "--name",
            "Dupes",
            "--blueprint",
            "duplicate_contact_point",
            "--set",
            "channel=email",
            "--set",
            "min_count=3",
        ])
        .unwrap();
        assert_eq!(args.data_file, Some(PathBuf::from("defs.json")));
        match args.command {
            Command::Create(create) => {
                assert!(create.id.is_none());
                assert_eq!(create.logic.set, vec!["channel=email", "min_count=3"]);
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[test]
    fn raw_file_conflicts_with_fields() {
        let result = CliArgs::try_parse_from([
            "alertdesk",
            "update",
            "d1",
            "--raw-file",
            "logic.json",
            "--set",
            "a=1",
        ]);
        assert!(result.is_err());
    }
}
