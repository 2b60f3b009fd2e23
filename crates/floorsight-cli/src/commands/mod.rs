//! Command implementations

mod ask;
mod crop;
mod doctor;
mod inspect;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use floorsight_core::config::{CliConfigOverrides, LayeredConfig};

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args, &config, &output),
        Commands::Crop(args) => crop::execute(args, &config, &output),
        Commands::Ask(args) => ask::execute(args, &config, &output).await,
        Commands::Doctor(args) => doctor::execute(args, &config, &output),
    }
}

/// Defaults, then the config file, then the environment, then global flags
fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults()
        .load_from_discovered_file(cli.config.as_deref())
        .context("Failed to load config file")?
        .load_from_env();

    config.update_from_cli(CliConfigOverrides {
        data_dir: cli.data_dir.clone(),
    });

    Ok(config)
}
