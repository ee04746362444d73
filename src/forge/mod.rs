//! forge
//!
//! Remote repository creation.
//!
//! # Architecture
//!
//! Each service family implements [`Provisioner`]:
//!
//! - [`github::GitHubProvisioner`] - REST create or fork
//! - [`gitlab::GitLabProvisioner`] - REST create, per host
//! - [`ssh::ShellProvisioner`] - bare repository over ssh, for raw
//!   `ssh://` targets and named sites
//!
//! The engine obtains one through [`create_provisioner`] and only sees the
//! trait, which keeps resolution and dispatch testable with
//! [`mock::MockProvisioner`].

pub mod factory;
pub mod github;
pub mod gitlab;
pub mod mock;
pub mod ssh;
pub mod traits;

pub use factory::{create_provisioner, ProvisionerDeps};
pub use ssh::{RemoteShell, SshShell};
pub use traits::{ForgeError, ProvisionRequest, Provisioner};
