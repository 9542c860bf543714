//! Sift CLI - Extract structured records from documents and text.

use clap::Parser;
use sift_cli::commands;
use sift_cli::{Cli, Command, Config, Formatter, OutputFormat, SessionStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> sift_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    let store = SessionStore::open_default();

    // CLI flag, then the remembered preference, then the config file
    let format = match cli.format {
        Some(format) => {
            let format: OutputFormat = format.into();
            store.set_preferred_format(format)?;
            format
        }
        None => store.preferred_format().unwrap_or(config.settings.format),
    };

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => {
            commands::execute_extract(args, &config, &store, &formatter).await?;
        }
        Command::Analyze => {
            commands::execute_analyze(&config, &store, &formatter).await?;
        }
        Command::History(args) => {
            commands::execute_history(args, &store, &formatter)?;
        }
        Command::Config(args) => {
            commands::execute_config(args, &config, config_path.as_deref(), &formatter)?;
        }
    }

    Ok(())
}
