//! Quill CLI - Blog content pipeline.
//!
//! Provides commands for:
//! - `build`: Run every pipeline stage (manifest, search index, feeds)
//! - `manifest`: Rebuild the content manifest
//! - `search-index`: Rebuild the search index
//! - `feeds`: Regenerate sitemap and RSS from the manifest

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::build;
use error::CliError;
use output::Output;
use quill_config::Config;

/// Quill - Blog content pipeline.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Path to quill.toml (searched in parent directories by default).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable info-level logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every pipeline stage in sequence.
    Build,
    /// Rebuild the content manifest.
    Manifest,
    /// Rebuild the search index.
    SearchIndex,
    /// Regenerate sitemap and RSS feed from the manifest.
    Feeds,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Build => build::run_build(&config, &output),
        Commands::Manifest => build::run_manifest(&config, &output),
        Commands::SearchIndex => build::run_search_index(&config, &output),
        Commands::Feeds => build::run_feeds(&config, &output),
    });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Load configuration from an explicit path or by discovery.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, CliError> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => {
            let cwd = std::env::current_dir()?;
            Config::load(&cwd)?
        }
    };
    Ok(config)
}
