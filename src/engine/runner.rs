//! engine::runner
//!
//! The single entry point for creating an upstream repository.
//!
//! # Architecture
//!
//! ```text
//! Resolve -> Visibility -> Branch check -> Describe -> Provision -> Attach
//! ```
//!
//! Every step before Provision is local and fallible, so malformed targets,
//! flag conflicts and unsupported branches are reported before any network
//! or remote-shell call. Provision and Attach are each a single blocking
//! step; nothing is rolled back if Attach fails.

use std::path::PathBuf;

use super::link::{LocalRepoLinker, ORIGIN};
use super::{Context, EngineError};
use crate::core::sites::SiteRegistry;
use crate::core::target::TargetResolver;
use crate::core::types::{ProvisionResult, Service, TargetDescriptor};
use crate::core::visibility;
use crate::forge::{ForgeError, ProvisionRequest, Provisioner};
use crate::git::GitClient;
use crate::ui::output;

/// Inputs of one `mkgit` invocation, after flag parsing.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// `-X` keyword (or the configured default site).
    pub site: Option<String>,
    /// Positional `project` or `ssh://` locator.
    pub target: Option<String>,
    /// Number of positional arguments given.
    pub arg_count: usize,
    /// Local repository directory.
    pub source_dir: PathBuf,
    pub private: bool,
    pub description: Option<String>,
    pub fork: bool,
    /// Overrides the site's repository link directory.
    pub repo_link: Option<String>,
}

/// Create the upstream repository described by `opts` and push to it.
///
/// `provisioner_for` is called at most once, after every local check has
/// passed.
pub fn create<F>(
    ctx: &Context,
    sites: &SiteRegistry,
    git: &dyn GitClient,
    opts: &CreateOptions,
    provisioner_for: F,
) -> Result<ProvisionResult, EngineError>
where
    F: FnOnce(&TargetDescriptor) -> Result<Box<dyn Provisioner>, ForgeError>,
{
    let verbosity = ctx.verbosity();

    let mut target = TargetResolver::new(sites, &opts.source_dir).resolve(
        opts.site.as_deref(),
        opts.target.as_deref(),
        opts.arg_count,
    )?;
    if let Some(link) = &opts.repo_link {
        target.repo_link_dir = Some(link.clone());
    }
    output::debug(format!("resolved target: {:?}", target), verbosity);

    if opts.fork && target.service != Service::GitHub {
        return Err(ForgeError::UnsupportedOperation(format!(
            "forking is only supported on GitHub, not {}",
            target.service.name()
        ))
        .into());
    }

    let choice = visibility::select(opts.private, opts.description.as_deref(), &target)?;

    let linker = LocalRepoLinker::new(git);
    let branch = linker.check_branch()?;

    let description = match choice.description {
        Some(d) => Some(d),
        None if target.service.is_hosted() => Some(default_description(git, &branch, &target)?),
        None => None,
    };

    let origin_url = if opts.fork {
        git.remote_url(ORIGIN)?
    } else {
        None
    };

    let provisioner = provisioner_for(&target)?;
    let message = if opts.fork {
        format!("Forking origin on {}", provisioner.name())
    } else {
        format!(
            "Creating {} {} repository {}",
            choice.visibility,
            provisioner.name(),
            target.project_name()
        )
    };
    output::print(message, verbosity);

    let request = ProvisionRequest {
        target,
        visibility: choice.visibility,
        description,
        fork: opts.fork,
        origin_url,
    };
    let result = block_on(provisioner.provision(&request))??;
    output::debug(format!("push url: {}", result.push_url), verbosity);

    let outcome = linker.attach(&result.push_url, &branch)?;
    if let Some(previous) = outcome.replaced {
        output::warn(format!("replaced existing origin ({})", previous), verbosity);
    }
    output::print(
        format!("Pushed {} to {}", branch, result.push_url),
        verbosity,
    );

    Ok(result)
}

/// Subject of the oldest commit, or the project name for an empty history.
fn default_description(
    git: &dyn GitClient,
    branch: &str,
    target: &TargetDescriptor,
) -> Result<String, EngineError> {
    Ok(git
        .first_commit_subject(branch)?
        .unwrap_or_else(|| target.project_name().base().to_string()))
}

/// Drive one future to completion on a current-thread runtime.
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, EngineError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| EngineError::Runtime(e.to_string()))?;
    Ok(runtime.block_on(future))
}
