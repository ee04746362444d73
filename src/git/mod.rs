//! git
//!
//! Single interface for local Git operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to the local repository. No other
//! module imports `git2` or runs `git`. Callers depend on the
//! [`GitClient`] trait so the engine can be exercised against
//! [`mock::MockGit`] without a real repository.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Current branch detection
//! - Remote add/remove/lookup
//! - Upstream push
//! - First-commit subject for default descriptions

mod interface;
pub mod mock;

pub use interface::{Git, GitClient, GitError};
