//! forge::factory
//!
//! Provisioner selection and creation.
//!
//! # Design
//!
//! The engine asks for a provisioner through [`create_provisioner`] and
//! never names a concrete implementation. Selection is by
//! [`Service`]; credentials are loaded here so that a missing token fails
//! before any network traffic.

use super::github::GitHubProvisioner;
use super::gitlab::GitLabProvisioner;
use super::ssh::{ShellProvisioner, SshShell};
use super::traits::{ForgeError, Provisioner};
use crate::core::config::Config;
use crate::core::target::DEFAULT_GITLAB_HOST;
use crate::core::types::{Service, TargetDescriptor};
use crate::secrets::{credentials, SecretStore};
use crate::ui::prompts::Prompter;

/// What a provisioner may need beyond the target itself.
pub struct ProvisionerDeps<'a> {
    pub config: &'a Config,
    pub secrets: &'a dyn SecretStore,
    /// Present only in interactive sessions.
    pub prompter: Option<&'a dyn Prompter>,
}

/// Create the provisioner for `target.service`.
///
/// # Errors
///
/// - [`ForgeError::Credentials`] if the service's credentials are missing
/// - [`ForgeError::UnsupportedOperation`] for an unresolved target
pub fn create_provisioner(
    target: &TargetDescriptor,
    deps: &ProvisionerDeps<'_>,
) -> Result<Box<dyn Provisioner>, ForgeError> {
    match target.service {
        Service::GitHub => {
            let creds = credentials::github(deps.secrets)?;
            Ok(Box::new(GitHubProvisioner::with_api_base(
                creds,
                deps.config.github_api_base(),
            )))
        }
        Service::GitLab => {
            let host = target.host.as_deref().unwrap_or(DEFAULT_GITLAB_HOST);
            let creds = credentials::gitlab(deps.secrets, host, deps.prompter)?;
            Ok(Box::new(GitLabProvisioner::new(
                creds,
                host,
                deps.config.gitlab_api_base(host),
            )))
        }
        Service::NamedSite | Service::RawSsh => {
            Ok(Box::new(ShellProvisioner::new(Box::new(SshShell))))
        }
        Service::None => Err(ForgeError::UnsupportedOperation(
            "no target service resolved".into(),
        )),
    }
}
