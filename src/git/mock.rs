//! git::mock
//!
//! In-memory [`GitClient`] for deterministic testing.
//!
//! # Example
//!
//! ```
//! use mkgit::git::mock::MockGit;
//! use mkgit::git::GitClient;
//!
//! let git = MockGit::on_branch("main");
//! git.add_remote("origin", "ssh://example.org/srv/a.git").unwrap();
//! assert!(git.add_remote("origin", "ssh://example.org/srv/b.git").is_err());
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::interface::{GitClient, GitError};

/// Operations recorded by [`MockGit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOperation {
    AddRemote { name: String, url: String },
    RemoveRemote { name: String },
    Push { remote: String, branch: String },
}

#[derive(Debug, Default)]
struct MockGitInner {
    branch: Option<String>,
    remotes: BTreeMap<String, String>,
    first_subject: Option<String>,
    unborn: bool,
    fail_push: bool,
    operations: Vec<GitOperation>,
}

/// Mock repository.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockGit {
    inner: Arc<Mutex<MockGitInner>>,
}

impl MockGit {
    /// A repository with `branch` checked out.
    pub fn on_branch(branch: &str) -> Self {
        let git = Self::default();
        git.lock().branch = Some(branch.to_string());
        git
    }

    /// A repository on `branch` before its first commit.
    pub fn unborn(branch: &str) -> Self {
        let git = Self::on_branch(branch);
        git.lock().unborn = true;
        git
    }

    /// A repository with a detached HEAD.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Pre-populate a remote.
    pub fn with_remote(self, name: &str, url: &str) -> Self {
        self.lock().remotes.insert(name.to_string(), url.to_string());
        self
    }

    /// Set the subject of the oldest commit.
    pub fn with_first_subject(self, subject: &str) -> Self {
        self.lock().first_subject = Some(subject.to_string());
        self
    }

    /// Make every push fail.
    pub fn failing_push(self) -> Self {
        self.lock().fail_push = true;
        self
    }

    /// Recorded mutating operations, in order.
    pub fn operations(&self) -> Vec<GitOperation> {
        self.lock().operations.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockGitInner> {
        self.inner.lock().expect("mock git lock poisoned")
    }
}

impl GitClient for MockGit {
    fn current_branch(&self) -> Result<Option<String>, GitError> {
        Ok(self.lock().branch.clone())
    }

    fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        Ok(self.lock().remotes.get(name).cloned())
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError> {
        let mut inner = self.lock();
        if inner.remotes.contains_key(name) {
            return Err(GitError::RemoteExists {
                name: name.to_string(),
            });
        }
        inner.remotes.insert(name.to_string(), url.to_string());
        inner.operations.push(GitOperation::AddRemote {
            name: name.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    fn remove_remote(&self, name: &str) -> Result<(), GitError> {
        let mut inner = self.lock();
        if inner.remotes.remove(name).is_none() {
            return Err(GitError::Internal {
                message: format!("remote '{}' does not exist", name),
            });
        }
        inner.operations.push(GitOperation::RemoveRemote {
            name: name.to_string(),
        });
        Ok(())
    }

    fn push_upstream(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        let mut inner = self.lock();
        inner.operations.push(GitOperation::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        if inner.fail_push {
            return Err(GitError::PushFailed {
                remote: remote.to_string(),
                branch: branch.to_string(),
                stderr: "mock push failure".to_string(),
            });
        }
        Ok(())
    }

    fn has_commits(&self, _branch: &str) -> Result<bool, GitError> {
        Ok(!self.lock().unborn)
    }

    fn first_commit_subject(&self, _branch: &str) -> Result<Option<String>, GitError> {
        Ok(self.lock().first_subject.clone())
    }
}
