//! Maplayers CLI
//!
//! Command-line interface for the map layer model.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use maplayers::cli::{commands, Cli, Commands};
use maplayers::MapLayersConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Maplayers v{}", env!("CARGO_PKG_VERSION"));

    let config = MapLayersConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Filter { input, filter } => commands::filter(&input, &filter)?,
        Commands::Fields { input } => commands::fields(&input)?,
        Commands::Render {
            definitions,
            ids,
            json,
        } => commands::render(config, &definitions, &ids, json).await?,
        Commands::Legend { definitions, id } => commands::legend(config, &definitions, &id).await?,
    }
    Ok(())
}
