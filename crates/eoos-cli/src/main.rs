use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use eoos_cli::commands::{batch, config, detect};
use eoos_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let settings =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?settings, "loaded configuration");

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Detect { file, json, all }) => {
            detect::run(&mut stdout, file, &settings, *json, *all)?;
        }
        Some(Commands::Batch { dir, json }) => {
            batch::run(&mut stdout, dir, &settings, *json)?;
        }
        Some(Commands::Config) => {
            config::run(&mut stdout, &settings)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
