//! cli
//!
//! Command-line interface layer.
//!
//! # Architecture
//!
//! The CLI layer is responsible for:
//! - Parsing command-line arguments via clap
//! - Loading configuration and the site registry
//! - Building the engine context
//! - Dispatching to the `create` or `--list-sites` handler
//!
//! The CLI layer does NOT contain business logic.

pub mod args;
pub mod commands;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::sites::SiteRegistry;
use crate::engine;
use crate::ui::output;
use args::Cli;

/// Main entry point for the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = Config::load().context("loading configuration")?;

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(config.interactive()),
    };
    if let Some(path) = config.loaded_from() {
        output::debug(format!("config: {}", path.display()), ctx.verbosity());
    }

    let sites = load_sites(cli.sites_dir.clone(), &config)?;

    if cli.list_sites {
        return commands::list_sites(&sites);
    }
    commands::create(&cli, &ctx, &config, &sites)
}

/// Discover named sites: `--sites-dir`, else the configured location.
pub fn load_sites(flag: Option<PathBuf>, config: &Config) -> Result<SiteRegistry> {
    match flag.or_else(|| config.sites_dir()) {
        Some(dir) => SiteRegistry::discover(&dir)
            .with_context(|| format!("reading sites from '{}'", dir.display())),
        None => Ok(SiteRegistry::empty()),
    }
}
