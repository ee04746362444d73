//! core::sites
//!
//! Named site discovery and loading.
//!
//! # Overview
//!
//! A named site is a reusable `{host, parent_path}` shortcut selected with
//! `-X <name>`. Sites live as files in a single directory (by default
//! `~/.mkgit`):
//!
//! - `site-<name>.toml` (canonical)
//! - `<name>.conf` (legacy `KEY=VALUE` lines: `GITHOST`, `PARENT`, `REPOLINK`)
//!
//! Legacy sites connect as `git@GITHOST` unless `GITHOST` names a user, and
//! default `PARENT` to the remote login directory.
//!
//! When both exist for one name, the TOML file wins. Files are plain data;
//! nothing in them is executed.
//!
//! # Example
//!
//! ```toml
//! # ~/.mkgit/site-home.toml
//! host = "git@git.example.org"
//! parent_path = "/srv/git"
//! repo_link_dir = "/srv/git/public"
//! visibility = "private"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Visibility;

/// Filename prefix of canonical site files.
pub const SITE_FILE_PREFIX: &str = "site-";

/// Extension of canonical site files.
const SITE_FILE_EXT: &str = ".toml";

/// Extension of legacy site files.
const LEGACY_FILE_EXT: &str = ".conf";

/// Login used for legacy `GITHOST` values that name no user.
const LEGACY_SSH_USER: &str = "git";

/// Parent of legacy sites without `PARENT`: the remote login directory.
const LEGACY_DEFAULT_PARENT: &str = "~";

/// Errors from site operations.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("unknown site '{name}' (known sites: {})", display_known(.known))]
    UnknownSite { name: String, known: Vec<String> },

    #[error("failed to read site file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse site file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

fn display_known(known: &[String]) -> String {
    if known.is_empty() {
        "none".to_string()
    } else {
        known.join(", ")
    }
}

/// A loaded named site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDefinition {
    pub name: String,
    pub host: String,
    pub parent_path: String,
    pub repo_link_dir: Option<String>,
    pub visibility: Option<Visibility>,
}

/// On-disk shape of `site-<name>.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct SiteFile {
    host: String,
    parent_path: String,
    #[serde(default)]
    repo_link_dir: Option<String>,
    #[serde(default)]
    visibility: Option<Visibility>,
}

/// Where a discovered site is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SiteSource {
    Toml(PathBuf),
    Legacy(PathBuf),
}

/// The set of named sites available to this invocation.
///
/// Discovery only records file names; a site's contents are parsed when
/// it is loaded, so one malformed file does not break unrelated targets.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: BTreeMap<String, SiteSource>,
}

impl SiteRegistry {
    /// A registry with no sites.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The default site directory, `~/.mkgit`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".mkgit"))
    }

    /// Scan `dir` for site files.
    ///
    /// A missing directory yields an empty registry.
    pub fn discover(dir: &Path) -> Result<Self, SiteError> {
        let mut registry = Self::empty();
        if !dir.is_dir() {
            return Ok(registry);
        }

        let entries = fs::read_dir(dir).map_err(|e| SiteError::ReadError {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut legacy = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SiteError::ReadError {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if let Some(name) = file_name
                .strip_prefix(SITE_FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(SITE_FILE_EXT))
            {
                if !name.is_empty() {
                    registry
                        .sites
                        .insert(name.to_string(), SiteSource::Toml(path.clone()));
                }
            } else if let Some(name) = file_name.strip_suffix(LEGACY_FILE_EXT) {
                if !name.is_empty() {
                    legacy.push((name.to_string(), path.clone()));
                }
            }
        }

        for (name, path) in legacy {
            registry
                .sites
                .entry(name)
                .or_insert(SiteSource::Legacy(path));
        }

        Ok(registry)
    }

    /// Names of all discovered sites, sorted.
    pub fn list_sites(&self) -> Vec<&str> {
        self.sites.keys().map(String::as_str).collect()
    }

    /// Whether `name` is a discovered site.
    pub fn contains(&self, name: &str) -> bool {
        self.sites.contains_key(name)
    }

    /// Load the definition for `name`.
    ///
    /// # Errors
    ///
    /// - [`SiteError::UnknownSite`] if no site file matches `name`
    /// - [`SiteError::ReadError`] / [`SiteError::ParseError`] for bad files
    pub fn load_site(&self, name: &str) -> Result<SiteDefinition, SiteError> {
        match self.sites.get(name) {
            Some(SiteSource::Toml(path)) => load_toml(name, path),
            Some(SiteSource::Legacy(path)) => load_legacy(name, path),
            None => Err(SiteError::UnknownSite {
                name: name.to_string(),
                known: self.sites.keys().cloned().collect(),
            }),
        }
    }
}

fn read(path: &Path) -> Result<String, SiteError> {
    fs::read_to_string(path).map_err(|e| SiteError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_error(path: &Path, message: impl Into<String>) -> SiteError {
    SiteError::ParseError {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn load_toml(name: &str, path: &Path) -> Result<SiteDefinition, SiteError> {
    let file: SiteFile =
        toml::from_str(&read(path)?).map_err(|e| parse_error(path, e.to_string()))?;

    build(name, path, file.host, file.parent_path, file.repo_link_dir, file.visibility)
}

fn load_legacy(name: &str, path: &Path) -> Result<SiteDefinition, SiteError> {
    let contents = read(path)?;

    let mut host = None;
    let mut parent = None;
    let mut repo_link = None;
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (var, val) = line
            .split_once('=')
            .ok_or_else(|| parse_error(path, format!("line {}: expected VAR=value", i + 1)))?;
        let val = val.trim().to_string();
        match var.trim() {
            "GITHOST" => host = Some(val),
            "PARENT" => parent = Some(val),
            "REPOLINK" => repo_link = Some(val),
            other => {
                return Err(parse_error(
                    path,
                    format!("line {}: unknown config variable '{}'", i + 1, other),
                ))
            }
        }
    }

    let host = host.ok_or_else(|| parse_error(path, "no GITHOST"))?;
    let host = if host.is_empty() || host.contains('@') {
        host
    } else {
        format!("{}@{}", LEGACY_SSH_USER, host)
    };
    let parent = parent.unwrap_or_else(|| LEGACY_DEFAULT_PARENT.to_string());
    build(name, path, host, parent, repo_link, None)
}

fn build(
    name: &str,
    path: &Path,
    host: String,
    parent_path: String,
    repo_link_dir: Option<String>,
    visibility: Option<Visibility>,
) -> Result<SiteDefinition, SiteError> {
    if host.is_empty() {
        return Err(parse_error(path, "host cannot be empty"));
    }
    if parent_path.is_empty() {
        return Err(parse_error(path, "parent path cannot be empty"));
    }

    Ok(SiteDefinition {
        name: name.to_string(),
        host,
        parent_path,
        repo_link_dir: repo_link_dir.filter(|d| !d.is_empty()),
        visibility,
    })
}
