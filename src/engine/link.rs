//! engine::link
//!
//! Connects the local repository to the freshly created upstream.
//!
//! # Invariants
//!
//! - Only `main` or `master` is ever pushed; any other checked-out branch is
//!   rejected by [`LocalRepoLinker::check_branch`], which the runner calls
//!   before any remote work.
//! - An existing `origin` is replaced, never merged, so reruns succeed.
//! - A failed push is fatal and leaves the remote repository in place.

use crate::git::{GitClient, GitError};

/// Name of the remote the linker manages.
pub const ORIGIN: &str = "origin";

/// Branches the linker will push.
pub const SUPPORTED_BRANCHES: [&str; 2] = ["main", "master"];

/// Result of [`LocalRepoLinker::attach`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOutcome {
    /// URL `origin` pointed at before it was replaced.
    pub replaced: Option<String>,
}

/// Sets `origin` and pushes the current branch.
pub struct LocalRepoLinker<'a> {
    git: &'a dyn GitClient,
}

impl<'a> LocalRepoLinker<'a> {
    pub fn new(git: &'a dyn GitClient) -> Self {
        Self { git }
    }

    /// The checked-out branch, if it is one we push.
    ///
    /// # Errors
    ///
    /// - [`GitError::NoBranch`] for a detached HEAD
    /// - [`GitError::UnsupportedBranch`] for anything but `main`/`master`
    /// - [`GitError::EmptyBranch`] if the branch has no commits
    pub fn check_branch(&self) -> Result<String, GitError> {
        let branch = self.git.current_branch()?.ok_or(GitError::NoBranch)?;
        if !SUPPORTED_BRANCHES.contains(&branch.as_str()) {
            return Err(GitError::UnsupportedBranch { branch });
        }
        if !self.git.has_commits(&branch)? {
            return Err(GitError::EmptyBranch { branch });
        }
        Ok(branch)
    }

    /// Point `origin` at `push_url` and push `branch` upstream.
    pub fn attach(&self, push_url: &str, branch: &str) -> Result<AttachOutcome, GitError> {
        let replaced = match self.git.add_remote(ORIGIN, push_url) {
            Ok(()) => None,
            Err(GitError::RemoteExists { .. }) => {
                let previous = self.git.remote_url(ORIGIN)?;
                self.git.remove_remote(ORIGIN)?;
                self.git.add_remote(ORIGIN, push_url)?;
                previous
            }
            Err(e) => return Err(e),
        };

        self.git.push_upstream(ORIGIN, branch)?;
        Ok(AttachOutcome { replaced })
    }
}
