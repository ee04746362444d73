//! core::types
//!
//! Strong types for the resolution pipeline.
//!
//! # Types
//!
//! - [`ProjectName`] - Project name normalized to end in `.git`
//! - [`Visibility`] - Public or private upstream
//! - [`Service`] - Which provisioning strategy a target uses
//! - [`TargetDescriptor`] - Fully resolved intent for one invocation
//! - [`ProvisionResult`] - The push URL produced by remote creation
//!
//! # Examples
//!
//! ```
//! use mkgit::core::types::ProjectName;
//!
//! let name = ProjectName::normalize("widget");
//! assert_eq!(name.as_str(), "widget.git");
//! assert_eq!(name.base(), "widget");
//!
//! // Normalizing twice changes nothing
//! assert_eq!(ProjectName::normalize(name.as_str()), name);
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Suffix every upstream project name carries.
pub const GIT_SUFFIX: &str = ".git";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid project name '{0}': must not contain '/'")]
    InvalidProjectName(String),
}

/// A project name that always ends in `.git`.
///
/// Normalization is idempotent and never inserts the suffix twice. Path
/// separators are left alone; hosted services reject them through
/// [`ProjectName::require_flat`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Append `.git` unless it is already present.
    pub fn normalize(raw: &str) -> Self {
        if raw.ends_with(GIT_SUFFIX) {
            Self(raw.to_string())
        } else {
            Self(format!("{}{}", raw, GIT_SUFFIX))
        }
    }

    /// The full name, including `.git`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without the trailing `.git`.
    pub fn base(&self) -> &str {
        self.0.strip_suffix(GIT_SUFFIX).unwrap_or(&self.0)
    }

    /// Reject names containing `/`.
    ///
    /// GitHub and GitLab name a project by a single path segment.
    pub fn require_flat(&self) -> Result<(), TypeError> {
        if self.base().contains('/') {
            return Err(TypeError::InvalidProjectName(self.0.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the upstream repository is visible to others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// The spelling GitHub and GitLab use.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remote-creation strategy selected for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Nothing resolved yet.
    None,
    GitHub,
    GitLab,
    /// A user-defined site loaded from the site registry.
    NamedSite,
    /// A literal `ssh://` locator.
    RawSsh,
}

impl Service {
    /// Whether the service is a hosted API (GitHub or GitLab).
    pub fn is_hosted(&self) -> bool {
        matches!(self, Service::GitHub | Service::GitLab)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Service::None => "none",
            Service::GitHub => "github",
            Service::GitLab => "gitlab",
            Service::NamedSite => "site",
            Service::RawSsh => "ssh",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The resolved intent of one invocation.
///
/// Built by the target resolver and consumed once by a provisioner. The
/// fields populated match `service`:
///
/// - `RawSsh`: `host`, `parent_path`
/// - `NamedSite`: `host`, `parent_path`, optionally `repo_link_dir` and
///   `site_visibility`
/// - `GitHub`: optionally `org`
/// - `GitLab`: `host`, optionally `org`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub service: Service,
    pub host: Option<String>,
    pub org: Option<String>,
    pub parent_path: Option<String>,
    pub repo_link_dir: Option<String>,
    /// Visibility hardcoded by a named site, if any.
    pub site_visibility: Option<Visibility>,
    /// Raw project as given (or defaulted); see [`TargetDescriptor::project_name`].
    pub project: String,
    /// Whether `project` came from the command line rather than the
    /// source directory name.
    pub project_given: bool,
    pub source_dir: PathBuf,
}

impl TargetDescriptor {
    /// An empty descriptor for `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            service: Service::None,
            host: None,
            org: None,
            parent_path: None,
            repo_link_dir: None,
            site_visibility: None,
            project: String::new(),
            project_given: false,
            source_dir: source_dir.into(),
        }
    }

    /// The project name normalized to end in `.git`.
    pub fn project_name(&self) -> ProjectName {
        ProjectName::normalize(&self.project)
    }
}

/// Outcome of remote creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub push_url: String,
}
