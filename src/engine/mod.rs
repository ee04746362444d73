//! engine
//!
//! Orchestrates one invocation: resolve the target, choose visibility,
//! check the branch, provision the remote, attach and push.
//!
//! # Architecture
//!
//! The engine owns ordering, not mechanics. Target grammar lives in
//! [`crate::core`], remote creation behind [`crate::forge::Provisioner`],
//! and local repository access behind [`crate::git::GitClient`]. Both
//! collaborators are injected, so the whole flow runs against mocks.
//!
//! # Invariants
//!
//! - All local validation happens before the first remote call
//! - At most one external call is in flight at any time
//! - No step is retried and nothing is rolled back

pub mod link;
pub mod runner;

pub use link::{AttachOutcome, LocalRepoLinker};
pub use runner::{create, CreateOptions};

use crate::core::target::TargetError;
use crate::core::visibility::VisibilityError;
use crate::forge::ForgeError;
use crate::git::GitError;
use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Visibility(#[from] VisibilityError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// The async runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(String),
}
