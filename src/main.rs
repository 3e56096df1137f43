//! Stencil - A static site generator for plain HTML sites.

mod assets;
mod build;
mod cli;
mod config;
mod diagnostic;
mod generator;
mod logger;
mod page;
mod serve;
mod template;
mod watch;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::serve_site;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Build => build_once(&config),
        Commands::Serve { .. } | Commands::Watch { .. } => {
            build_once(&config)?;
            serve_site(Arc::new(config), cli.is_watch())
        }
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let mut config = SiteConfig::load(&cli.site)?;
    config.update_with_cli(cli);
    config.validate()?;

    if config.config_path.is_file() {
        log!("config"; "{}", config.config_path.display());
    }
    Ok(config)
}

/// Run one build pass and print its diagnostics.
///
/// Per-page problems are reported but do not fail the command.
fn build_once(config: &SiteConfig) -> Result<()> {
    let report = build_site(config)?;
    logger::report(&report.diagnostics);
    Ok(())
}
