//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Environment (`$MKGIT_SITES_DIR`)
//! 4. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$MKGIT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/mkgit/config.toml`
//! 3. `~/.mkgit/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use mkgit::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! if let Some(dir) = config.sites_dir() {
//!     println!("sites in {}", dir.display());
//! }
//! println!("GitHub API: {}", config.github_api_base());
//! ```

pub mod schema;

pub use schema::{GitHubConfig, GitLabConfig, GlobalConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::sites::SiteRegistry;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MKGIT_CONFIG";

/// Environment variable overriding the site directory.
pub const SITES_DIR_ENV: &str = "MKGIT_SITES_DIR";

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file '{path}' named by MKGIT_CONFIG does not exist")]
    Missing { path: PathBuf },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation, or if `$MKGIT_CONFIG` names a missing file. A
    /// missing file in the default locations is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::locate()?;
        let global = match &path {
            Some(p) => Self::read(p)?,
            None => GlobalConfig::default(),
        };
        global.validate()?;

        Ok(Self { global, path })
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let global = Self::read(path)?;
        global.validate()?;
        Ok(Self {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the config file for this process environment.
    fn locate() -> Result<Option<PathBuf>, ConfigError> {
        Self::locate_from(
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            dirs::home_dir(),
        )
    }

    /// An explicit path must exist; the default locations are optional.
    fn locate_from(
        explicit: Option<PathBuf>,
        xdg_home: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
            if !path.is_file() {
                return Err(ConfigError::Missing { path });
            }
            return Ok(Some(path));
        }

        let candidates = [
            xdg_home.map(|dir| dir.join("mkgit/config.toml")),
            home.map(|dir| dir.join(".mkgit/config.toml")),
        ];
        Ok(candidates.into_iter().flatten().find(|p| p.exists()))
    }

    fn read(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Directory holding named site files.
    ///
    /// `$MKGIT_SITES_DIR` wins over the config file; both fall back to
    /// `~/.mkgit`.
    pub fn sites_dir(&self) -> Option<PathBuf> {
        if let Ok(dir) = std::env::var(SITES_DIR_ENV) {
            if !dir.is_empty() {
                return Some(PathBuf::from(dir));
            }
        }
        self.global
            .sites_dir
            .clone()
            .or_else(SiteRegistry::default_dir)
    }

    /// Directory holding credential dotfiles. Defaults to the home directory.
    pub fn credentials_dir(&self) -> Option<PathBuf> {
        self.global.credentials_dir.clone().or_else(dirs::home_dir)
    }

    /// Keyword used when `-X` is absent.
    pub fn default_site(&self) -> Option<&str> {
        self.global.default_site.as_deref()
    }

    /// Whether prompts are allowed. Defaults to `true`.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// GitHub REST API base URL.
    pub fn github_api_base(&self) -> &str {
        self.global
            .github
            .as_ref()
            .and_then(|g| g.api_base.as_deref())
            .unwrap_or(DEFAULT_GITHUB_API_BASE)
    }

    /// GitLab REST API base URL for `host`.
    pub fn gitlab_api_base(&self, host: &str) -> String {
        let scheme = self
            .global
            .gitlab
            .as_ref()
            .and_then(|g| g.api_scheme.as_deref())
            .unwrap_or("https");
        format!("{}://{}/api/v4", scheme, host)
    }

    /// Path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
