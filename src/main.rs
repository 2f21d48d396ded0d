//! Vellum - build-time rss feed generator for Markdown blogs.

mod cli;
mod config;
mod content;
mod generator;
mod logger;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use generator::rss::{build_rss, query_entries};
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        log!("error"; "{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Build { .. } => build_rss(&config),
        Commands::Query { pretty, .. } => print_entries(&config, *pretty),
    }
}

/// Load configuration, apply CLI overrides and validate it.
///
/// A missing config file is not an error: the built-in defaults describe
/// the site.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        log!("config"; "{} not found, using defaults", config_path.display());
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

fn print_entries(config: &SiteConfig, pretty: bool) -> Result<()> {
    let entries = query_entries(config)?;
    let json = if pretty {
        serde_json::to_string_pretty(&entries)
    } else {
        serde_json::to_string(&entries)
    }
    .context("failed to serialize feed entries")?;

    println!("{json}");
    Ok(())
}
