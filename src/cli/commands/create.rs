//! cli::commands::create
//!
//! The default `mkgit` action: create the upstream and push.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::sites::SiteRegistry;
use crate::engine::{self, Context, CreateOptions};
use crate::forge::{create_provisioner, ProvisionerDeps};
use crate::git::Git;
use crate::secrets;
use crate::ui::prompts::{Prompter, TerminalPrompter};

use crate::cli::args::Cli;

/// Site keyword used when `-F` is given without `-X`.
const FORK_DEFAULT_SITE: &str = "github";

/// Pick the site keyword: `-X`, then `-F` implies GitHub, then the
/// configured default unless the target is a raw `ssh://` locator.
pub fn effective_site(
    explicit: Option<&str>,
    fork: bool,
    target: Option<&str>,
    default_site: Option<&str>,
) -> Option<String> {
    if let Some(site) = explicit {
        return Some(site.to_string());
    }
    if fork {
        return Some(FORK_DEFAULT_SITE.to_string());
    }
    let is_ssh = target.is_some_and(|t| t.starts_with("ssh://"));
    if is_ssh {
        return None;
    }
    default_site.map(String::from)
}

/// Run the create flow.
pub fn create(cli: &Cli, ctx: &Context, config: &Config, sites: &SiteRegistry) -> Result<()> {
    let source_dir = match &cli.source_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let source_dir: PathBuf = source_dir
        .canonicalize()
        .with_context(|| format!("source directory '{}' not found", source_dir.display()))?;

    let git = Git::open(&source_dir)?;

    let opts = CreateOptions {
        site: effective_site(
            cli.site.as_deref(),
            cli.fork,
            cli.project.as_deref(),
            config.default_site(),
        ),
        target: cli.project.clone(),
        arg_count: cli.arg_count(),
        source_dir,
        private: cli.private,
        description: cli.description.clone(),
        fork: cli.fork,
        repo_link: cli.repo_link.clone(),
    };

    let terminal = TerminalPrompter;
    let prompter: Option<&dyn Prompter> = if ctx.interactive {
        Some(&terminal)
    } else {
        None
    };

    engine::create(ctx, sites, &git, &opts, |target| {
        let store = secrets::create_store(config.credentials_dir())?;
        create_provisioner(
            target,
            &ProvisionerDeps {
                config,
                secrets: store.as_ref(),
                prompter,
            },
        )
    })?;

    Ok(())
}
