//! git::interface
//!
//! Git interface implementation using git2.
//!
//! # Architecture
//!
//! [`GitClient`] is the only way the engine talks to the local repository.
//! [`Git`] implements it with `git2` for reads and remote configuration,
//! and shells out to `git push` so the user's ssh agent, credential
//! helpers and hooks apply to the push.
//!
//! # Example
//!
//! ```ignore
//! use mkgit::git::{Git, GitClient};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! if let Some(branch) = git.current_branch()? {
//!     println!("on {}", branch);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// HEAD does not point at a branch.
    #[error("HEAD is detached; check out main or master")]
    NoBranch,

    /// The checked-out branch has no commits yet.
    #[error("branch '{branch}' has no commits to push")]
    EmptyBranch {
        /// The checked-out branch
        branch: String,
    },

    /// The checked-out branch is neither `main` nor `master`.
    #[error("unsupported branch '{branch}': check out main or master first")]
    UnsupportedBranch {
        /// The checked-out branch
        branch: String,
    },

    /// A remote with this name already exists.
    #[error("remote '{name}' already exists")]
    RemoteExists {
        /// The remote name
        name: String,
    },

    /// `git push` exited non-zero.
    #[error("push of '{branch}' to '{remote}' failed: {stderr}")]
    PushFailed {
        remote: String,
        branch: String,
        stderr: String,
    },

    /// Internal git2 or process error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Operations the engine needs from the local repository.
pub trait GitClient {
    /// The checked-out branch, or `None` if HEAD is detached.
    ///
    /// An unborn HEAD still reports the branch it will create.
    fn current_branch(&self) -> Result<Option<String>, GitError>;

    /// URL of remote `name`, or `None` if it does not exist.
    fn remote_url(&self, name: &str) -> Result<Option<String>, GitError>;

    /// Add remote `name`.
    ///
    /// # Errors
    ///
    /// [`GitError::RemoteExists`] if the name is taken.
    fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError>;

    /// Remove remote `name`.
    fn remove_remote(&self, name: &str) -> Result<(), GitError>;

    /// Push `branch` to `remote` and set it as the branch's upstream.
    fn push_upstream(&self, remote: &str, branch: &str) -> Result<(), GitError>;

    /// Whether `branch` points at a commit.
    fn has_commits(&self, branch: &str) -> Result<bool, GitError>;

    /// Subject line of the oldest commit on `branch`, if any.
    fn first_commit_subject(&self, branch: &str) -> Result<Option<String>, GitError>;
}

/// The Git interface for Git operations.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Path to the working directory.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }
}

impl GitClient for Git {
    fn current_branch(&self) -> Result<Option<String>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                // An unborn HEAD still names the branch it will create.
                let reference = self.repo.find_reference("HEAD")?;
                return Ok(reference
                    .symbolic_target()
                    .and_then(|t| t.strip_prefix("refs/heads/"))
                    .map(String::from));
            }
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            return Ok(head.shorthand().map(String::from));
        }

        Ok(None) // Detached HEAD
    }

    fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError> {
        match self.repo.remote(name, url) {
            Ok(_) => Ok(()),
            Err(e) if e.code() == git2::ErrorCode::Exists => Err(GitError::RemoteExists {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_remote(&self, name: &str) -> Result<(), GitError> {
        self.repo.remote_delete(name)?;
        Ok(())
    }

    fn push_upstream(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        let output = Command::new("git")
            .args(["push", "-u", remote, branch])
            .current_dir(self.work_dir()?)
            .output()
            .map_err(|e| GitError::Internal {
                message: format!("cannot run git push: {}", e),
            })?;

        if !output.status.success() {
            return Err(GitError::PushFailed {
                remote: remote.to_string(),
                branch: branch.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn has_commits(&self, branch: &str) -> Result<bool, GitError> {
        match self.repo.refname_to_id(&format!("refs/heads/{}", branch)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn first_commit_subject(&self, branch: &str) -> Result<Option<String>, GitError> {
        let refname = format!("refs/heads/{}", branch);
        let tip = match self.repo.refname_to_id(&refname) {
            Ok(oid) => oid,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut walk = self.repo.revwalk()?;
        walk.push(tip)?;
        walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::REVERSE)?;

        let Some(oid) = walk.next().transpose()? else {
            return Ok(None);
        };
        let commit = self.repo.find_commit(oid)?;
        Ok(commit
            .summary()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn run_git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("git command failed");

        if !output.status.success() {
            panic!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }

    fn test_repo(branch: &str) -> TempDir {
        let dir = TempDir::new().expect("failed to create temp dir");
        run_git(dir.path(), &["init", "-b", branch]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        dir
    }

    fn commit(dir: &Path, file: &str, message: &str) {
        fs::write(dir.join(file), message).unwrap();
        run_git(dir, &["add", file]);
        run_git(dir, &["commit", "-m", message]);
    }

    #[test]
    fn open_non_repo_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Git::open(dir.path()),
            Err(GitError::NotARepo { .. })
        ));
    }

    #[test]
    fn current_branch_on_unborn_head() {
        let dir = test_repo("main");
        let git = Git::open(dir.path()).unwrap();
        assert_eq!(git.current_branch().unwrap().as_deref(), Some("main"));
    }

    #[test]
    fn has_commits_tracks_history() {
        let dir = test_repo("main");
        let git = Git::open(dir.path()).unwrap();
        assert!(!git.has_commits("main").unwrap());

        commit(dir.path(), "a.txt", "first");
        assert!(git.has_commits("main").unwrap());
    }

    #[test]
    fn current_branch_after_commit() {
        let dir = test_repo("master");
        commit(dir.path(), "a.txt", "first");
        let git = Git::open(dir.path()).unwrap();
        assert_eq!(git.current_branch().unwrap().as_deref(), Some("master"));
    }

    #[test]
    fn remote_lifecycle() {
        let dir = test_repo("main");
        let git = Git::open(dir.path()).unwrap();

        assert_eq!(git.remote_url("origin").unwrap(), None);
        git.add_remote("origin", "ssh://example.org/srv/a.git").unwrap();
        assert_eq!(
            git.remote_url("origin").unwrap().as_deref(),
            Some("ssh://example.org/srv/a.git")
        );

        assert!(matches!(
            git.add_remote("origin", "ssh://example.org/srv/b.git"),
            Err(GitError::RemoteExists { .. })
        ));

        git.remove_remote("origin").unwrap();
        assert_eq!(git.remote_url("origin").unwrap(), None);
    }

    #[test]
    fn first_commit_subject_is_oldest() {
        let dir = test_repo("main");
        commit(dir.path(), "a.txt", "Initial import");
        commit(dir.path(), "b.txt", "Second change");
        let git = Git::open(dir.path()).unwrap();

        assert_eq!(
            git.first_commit_subject("main").unwrap().as_deref(),
            Some("Initial import")
        );
    }

    #[test]
    fn first_commit_subject_without_history() {
        let dir = test_repo("main");
        let git = Git::open(dir.path()).unwrap();
        assert_eq!(git.first_commit_subject("main").unwrap(), None);
    }

    #[test]
    fn push_upstream_to_local_bare_repo() {
        let dir = test_repo("main");
        commit(dir.path(), "a.txt", "first");
        let bare = TempDir::new().unwrap();
        run_git(bare.path(), &["init", "--bare"]);

        let git = Git::open(dir.path()).unwrap();
        git.add_remote("origin", bare.path().to_str().unwrap()).unwrap();
        git.push_upstream("origin", "main").unwrap();

        let output = Command::new("git")
            .args(["rev-parse", "--abbrev-ref", "main@{upstream}"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "origin/main");
    }

    #[test]
    fn push_failure_reports_stderr() {
        let dir = test_repo("main");
        commit(dir.path(), "a.txt", "first");
        let git = Git::open(dir.path()).unwrap();
        git.add_remote("origin", "/nonexistent/mkgit/remote.git").unwrap();

        assert!(matches!(
            git.push_upstream("origin", "main"),
            Err(GitError::PushFailed { .. })
        ));
    }
}
