mod cli;
mod commands;
mod config;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use alertdesk_core::{load_dotenv, Config};
use alertdesk_rules::ConfigSession;

use crate::cli::CliArgs;
use crate::config::Backend;
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let terminal = Terminal::new();

    let config = match args.profile.as_deref() {
        Some(profile) => Config::from_lookup(profile, |key| std::env::var(key).ok()),
        None => Config::from_env(),
    };
    config.log_summary();

    let backend = Backend::resolve(&config, &args);
    info!(backend = %backend.describe(), "using definition backend");
    let store = backend.open().context("failed to open definition store")?;

    let mut session = ConfigSession::new(store);
    if let Err(e) = commands::run(args.command, &mut session, &terminal).await {
        terminal.print_error(&format!("{:#}", e))?;
        std::process::exit(1);
    }
    Ok(())
}
