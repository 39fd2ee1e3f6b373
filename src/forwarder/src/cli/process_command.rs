use super::commands::{Cli, Command};
use super::run::run;
use crate::config::{Config, ConfigLoader};
use crate::logging::setup_logging;
use anyhow::{Context, Result};
use clap::Parser;

/// Process the command line.
pub fn process_command() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Command::Config => print_config(&config),
        Command::Run { input } => {
            setup_logging(&config.log_level, config.log_file.as_deref())?;

            tokio::runtime::Runtime::new()
                .context("failed to start the async runtime")?
                .block_on(run(&config, input.as_deref()))
        }
    }
}

fn print_config(config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(&config.to_safe_json())?;
    println!("{}", json);
    println!("Endpoint: {}", config.endpoint()?);
    Ok(())
}
