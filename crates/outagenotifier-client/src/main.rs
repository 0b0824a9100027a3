//! outagenotifier CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use outagenotifier_client::cli::{Cli, Command, ConfigAction};
use outagenotifier_client::commands;
use outagenotifier_client::config::ClientConfig;
use outagenotifier_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    cli.init_output()?;

    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    let color = cli.use_color();

    match cli.command {
        Some(Command::Refresh) => commands::outages::refresh(&config).await,
        Some(Command::Watch) => commands::watch::run(&config).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        },
        Some(Command::Show) | None => commands::outages::show(&config, color),
    }
}
