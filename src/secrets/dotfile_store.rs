//! secrets::dotfile_store
//!
//! One-line dotfile secret storage.
//!
//! # Layout
//!
//! Each key is stored in its own file, `<dir>/.<key>`, holding exactly one
//! line. With the default directory (the user's home) this gives
//! `~/.githubuser`, `~/.github-oauthtoken`, `~/.gitlabuser-<host>` and
//! `~/.gitlab-token-<host>`.
//!
//! # Security
//!
//! - File permissions are set to 0600 on Unix before content is written
//! - All writes are atomic (write to temp file, then rename)
//! - Secret values never appear in error messages

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

/// Secret store keeping one dotfile per key.
#[derive(Debug, Clone)]
pub struct DotfileStore {
    /// Directory holding the dotfiles
    dir: PathBuf,
}

impl DotfileStore {
    /// Create a store rooted at the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self { dir: home })
    }

    /// Create a store rooted at `dir`.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}", key))
    }

    fn check_key(key: &str) -> Result<(), SecretError> {
        if key.is_empty() || key.contains('/') || key.contains('\\') {
            return Err(SecretError::ReadError(format!("invalid secret key '{}'", key)));
        }
        Ok(())
    }
}

impl SecretStore for DotfileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Self::check_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            SecretError::ReadError(format!("cannot read {}: {}", path.display(), e))
        })?;

        let value = content.trim();
        if value.lines().count() > 1 {
            return Err(SecretError::ReadError(format!(
                "{}: expected one line",
                path.display()
            )));
        }
        if value.is_empty() {
            return Ok(None);
        }

        Ok(Some(value.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        Self::check_key(key)?;
        if value.contains('\n') {
            return Err(SecretError::WriteError(format!(
                "value for '{}' must be a single line",
                key
            )));
        }

        fs::create_dir_all(&self.dir)
            .map_err(|e| SecretError::WriteError(format!("cannot create directory: {}", e)))?;

        let path = self.path_for(key);
        let temp_path = self.dir.join(format!(".{}.tmp", key));

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| SecretError::WriteError(format!("cannot create temp file: {}", e)))?;

            #[cfg(unix)]
            {
                let permissions = fs::Permissions::from_mode(0o600);
                file.set_permissions(permissions).map_err(|e| {
                    SecretError::WriteError(format!("cannot set permissions: {}", e))
                })?;
            }

            writeln!(file, "{}", value)
                .map_err(|e| SecretError::WriteError(format!("cannot write secret: {}", e)))?;

            file.sync_all()
                .map_err(|e| SecretError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &path)
            .map_err(|e| SecretError::WriteError(format!("cannot rename temp file: {}", e)))?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        Self::check_key(key)?;
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SecretError::DeleteError(format!(
                "cannot remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn location(&self, key: &str) -> String {
        self.path_for(key).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, DotfileStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = DotfileStore::with_dir(temp.path().to_path_buf());
        (temp, store)
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let (_temp, store) = create_test_store();
        assert!(store.get("githubuser").expect("get").is_none());
    }

    #[test]
    fn reads_existing_dotfile() {
        let (temp, store) = create_test_store();
        fs::write(temp.path().join(".githubuser"), "octocat\n").unwrap();

        assert_eq!(
            store.get("githubuser").expect("get"),
            Some("octocat".to_string())
        );
    }

    #[test]
    fn multi_line_file_rejected() {
        let (temp, store) = create_test_store();
        fs::write(temp.path().join(".github-oauthtoken"), "one\ntwo\n").unwrap();

        let err = store.get("github-oauthtoken").unwrap_err();
        assert!(err.to_string().contains("expected one line"));
    }

    #[test]
    fn empty_file_is_absent() {
        let (temp, store) = create_test_store();
        fs::write(temp.path().join(".githubuser"), "\n").unwrap();
        assert!(store.get("githubuser").unwrap().is_none());
    }

    #[test]
    fn set_and_get() {
        let (temp, store) = create_test_store();

        store.set("gitlab-token-gitlab.com", "glpat-x").expect("set");

        assert!(temp.path().join(".gitlab-token-gitlab.com").exists());
        assert_eq!(
            store.get("gitlab-token-gitlab.com").expect("get"),
            Some("glpat-x".to_string())
        );
    }

    #[test]
    fn set_overwrites() {
        let (_temp, store) = create_test_store();

        store.set("key", "value1").expect("first set");
        store.set("key", "value2").expect("second set");

        assert_eq!(store.get("key").expect("get"), Some("value2".to_string()));
    }

    #[test]
    fn set_rejects_multi_line_value() {
        let (_temp, store) = create_test_store();
        assert!(store.set("key", "a\nb").is_err());
    }

    #[test]
    fn delete_existing_and_missing() {
        let (_temp, store) = create_test_store();

        store.set("key", "value").expect("set");
        store.delete("key").expect("delete");
        assert!(store.get("key").expect("get").is_none());

        store.delete("key").expect("delete missing");
    }

    #[test]
    fn require_reports_path() {
        let (temp, store) = create_test_store();

        let err = store.require("githubuser").unwrap_err();
        match err {
            SecretError::Missing { key, path } => {
                assert_eq!(key, "githubuser");
                assert_eq!(path, temp.path().join(".githubuser").display().to_string());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn rejects_path_like_keys() {
        let (_temp, store) = create_test_store();
        assert!(store.get("../etc/passwd").is_err());
        assert!(store.set("", "x").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn permissions_0600_on_unix() {
        let (_temp, store) = create_test_store();

        store.set("key", "value").expect("set");

        let metadata = fs::metadata(store.path_for("key")).expect("metadata");
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "permissions should be 0600");
    }

    #[test]
    fn error_does_not_leak_value() {
        let (temp, store) = create_test_store();
        fs::write(temp.path().join(".tok"), "secret-one\nsecret-two\n").unwrap();

        let err = store.get("tok").unwrap_err().to_string();
        assert!(!err.contains("secret-one"));
    }
}
