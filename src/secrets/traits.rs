//! secrets::traits
//!
//! Secret storage trait definition.
//!
//! # Design
//!
//! The `SecretStore` trait is a simple key-value interface. Keys name a
//! single credential, for example `githubuser` or `gitlab-token-gitlab.com`.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include secrets in error messages
//! - Be thread-safe (Send + Sync)

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Messages name keys and paths, never values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// A required credential is absent.
    #[error("missing credential '{key}': create {path}")]
    Missing { key: String, path: String },

    /// Failed to read from secret storage.
    #[error("failed to read secret: {0}")]
    ReadError(String),

    /// Failed to write to secret storage.
    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// Failed to delete from secret storage.
    #[error("failed to delete secret: {0}")]
    DeleteError(String),
}

/// Trait for secret storage providers.
pub trait SecretStore: Send + Sync {
    /// Get a secret by key.
    ///
    /// Returns `Ok(None)` if the secret does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Set a secret, overwriting any existing value.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Delete a secret. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    /// Where `key` lives, for error messages.
    fn location(&self, key: &str) -> String;

    /// Check if a secret exists.
    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }

    /// Get a secret that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Missing`] if the key is absent.
    fn require(&self, key: &str) -> Result<String, SecretError> {
        self.get(key)?.ok_or_else(|| SecretError::Missing {
            key: key.to_string(),
            path: self.location(key),
        })
    }
}
