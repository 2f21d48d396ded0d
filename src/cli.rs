//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vellum rss feed generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: vellum.toml)
    #[arg(short = 'C', long, default_value = "vellum.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every command that scans content.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Override base URL for the site.
    ///
    /// Useful for preview deployments whose URL differs from production,
    /// without touching vellum.toml.
    ///
    /// Example:
    ///   vellum build --base-url "https://preview.example.com"
    #[arg(long = "base-url")]
    pub base_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate the rss feed into the output directory.
    ///
    /// Meant to run once at the end of the site build.
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory path (relative to project root)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// enable rss feed generation
        #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        rss: Option<bool>,
    },

    /// Print the feed entries as JSON without writing anything
    Query {
        #[command(flatten)]
        source: SourceArgs,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

impl Cli {
    pub const fn source(&self) -> &SourceArgs {
        match &self.command {
            Commands::Build { source, .. } | Commands::Query { source, .. } => source,
        }
    }
}
