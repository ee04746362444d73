//! secrets
//!
//! Credential storage for the hosted services.
//!
//! # Architecture
//!
//! Secrets are read through the [`SecretStore`] trait. The default
//! implementation, [`DotfileStore`], keeps one secret per one-line dotfile
//! in the home directory (or the configured `credentials_dir`).
//!
//! # Security
//!
//! - Secrets are **never** logged or included in error messages
//! - Files are written with 0600 permissions on Unix
//! - All writes are atomic (temp file + rename)
//!
//! # Example
//!
//! ```ignore
//! use mkgit::secrets::{credentials, DotfileStore};
//!
//! let store = DotfileStore::new()?;
//! let creds = credentials::github(&store)?;
//! // Use creds.token (never print it!)
//! ```

pub mod credentials;
mod dotfile_store;
mod traits;

use std::path::PathBuf;

pub use credentials::Credentials;
pub use dotfile_store::DotfileStore;
pub use traits::{SecretError, SecretStore};

/// Create the secret store rooted at `dir`, or at the home directory.
pub fn create_store(dir: Option<PathBuf>) -> Result<Box<dyn SecretStore>, SecretError> {
    match dir {
        Some(dir) => Ok(Box::new(DotfileStore::with_dir(dir))),
        None => Ok(Box::new(DotfileStore::new()?)),
    }
}
