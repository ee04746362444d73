//! forge::traits
//!
//! Provisioner trait definition for creating remote repositories.
//!
//! # Design
//!
//! The `Provisioner` trait is async because the hosted variants perform
//! network I/O. The engine awaits exactly one provisioning call per
//! invocation, so there is never more than one request in flight.
//!
//! # Example
//!
//! ```ignore
//! use mkgit::forge::{Provisioner, ProvisionRequest};
//!
//! async fn create(p: &dyn Provisioner, request: ProvisionRequest) -> Result<(), ForgeError> {
//!     let result = p.provision(&request).await?;
//!     println!("push to {}", result.push_url);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{ProjectName, ProvisionResult, TargetDescriptor, Visibility};
use crate::secrets::SecretError;

/// Errors from provisioning operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Hosted project names cannot contain path separators.
    #[error("invalid project name '{0}': hosted projects cannot contain '/'")]
    InvalidProjectName(String),

    /// Forks are always public.
    #[error("forks must be public; drop -p")]
    ForkMustBePublic,

    /// The operation is not supported by this provisioner.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The target descriptor lacks a field this provisioner needs.
    #[error("incomplete target: missing {0}")]
    IncompleteTarget(&'static str),

    /// Credentials could not be loaded.
    #[error(transparent)]
    Credentials(#[from] SecretError),

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The remote provisioning command failed.
    #[error("remote command on {host} failed ({status}): {stderr}")]
    RemoteShellFailure {
        host: String,
        /// Exit status, or `signal` if the process was killed
        status: String,
        stderr: String,
    },
}

/// Everything a provisioner needs to create one remote repository.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Resolved target.
    pub target: TargetDescriptor,
    pub visibility: Visibility,
    pub description: Option<String>,
    /// Fork the repository `origin_url` points at instead of creating one.
    pub fork: bool,
    /// Current `origin` URL of the local repository, if any.
    pub origin_url: Option<String>,
}

impl ProvisionRequest {
    /// Normalized project name.
    pub fn project(&self) -> ProjectName {
        self.target.project_name()
    }

    /// Normalized project name, rejecting path separators.
    ///
    /// # Errors
    ///
    /// [`ForgeError::InvalidProjectName`] if the name contains `/`.
    pub fn flat_project(&self) -> Result<ProjectName, ForgeError> {
        let name = self.project();
        name.require_flat()
            .map_err(|_| ForgeError::InvalidProjectName(name.as_str().to_string()))?;
        Ok(name)
    }
}

/// The Provisioner trait for creating remote repositories.
///
/// One implementation exists per service family: GitHub, GitLab, and
/// ssh-reachable hosts (raw locators and named sites).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Short name for messages (e.g. "github").
    fn name(&self) -> &'static str;

    /// Create the remote repository and return the URL to push to.
    async fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionResult, ForgeError>;
}
