//! core::config::schema
//!
//! Configuration schema types.
//!
//! Located at (in order of precedence):
//! 1. `$MKGIT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/mkgit/config.toml`
//! 3. `~/.mkgit/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing so a typo fails loudly
//! instead of silently falling back to a default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// default_site = "github"
/// sites_dir = "/home/me/.mkgit"
/// credentials_dir = "/home/me"
/// interactive = true
///
/// [github]
/// api_base = "https://api.github.com"
///
/// [gitlab]
/// api_scheme = "https"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Keyword used when `-X` is absent and the target is not an ssh:// URL
    pub default_site: Option<String>,

    /// Directory holding named site files
    pub sites_dir: Option<PathBuf>,

    /// Directory holding credential dotfiles
    pub credentials_dir: Option<PathBuf>,

    /// Default interactive mode
    pub interactive: Option<bool>,

    /// GitHub settings
    pub github: Option<GitHubConfig>,

    /// GitLab settings
    pub gitlab: Option<GitLabConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(site) = &self.default_site {
            if site.is_empty() || site.starts_with("ssh://") {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid default_site '{}': must be a site keyword",
                    site
                )));
            }
        }

        if let Some(github) = &self.github {
            github.validate()?;
        }
        if let Some(gitlab) = &self.gitlab {
            gitlab.validate()?;
        }

        Ok(())
    }
}

/// GitHub settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_base: Option<String>,
}

impl GitHubConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid github.api_base '{}': must be an http(s) URL",
                    base
                )));
            }
        }
        Ok(())
    }
}

/// GitLab settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitLabConfig {
    /// Scheme used to reach `<host>/api/v4`
    pub api_scheme: Option<String>,
}

impl GitLabConfig {
    /// Valid API schemes.
    pub const VALID_SCHEMES: &'static [&'static str] = &["https", "http"];

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(scheme) = &self.api_scheme {
            if !Self::VALID_SCHEMES.contains(&scheme.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid gitlab.api_scheme '{}', must be one of: {}",
                    scheme,
                    Self::VALID_SCHEMES.join(", ")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GlobalConfig::default();
        assert!(config.default_site.is_none());
        assert!(config.sites_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn valid_default_site() {
        let config = GlobalConfig {
            default_site: Some("gitlab-acme".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ssh_default_site_rejected() {
        let config = GlobalConfig {
            default_site: Some("ssh://host/srv".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_api_base() {
        let config = GlobalConfig {
            github: Some(GitHubConfig {
                api_base: Some("api.github.com".to_string()),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_gitlab_scheme() {
        let config = GlobalConfig {
            gitlab: Some(GitLabConfig {
                api_scheme: Some("ftp".to_string()),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            default_site = "github"
            unknown_field = true
        "#;

        let result: Result<GlobalConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn parses_full_file() {
        let toml = r#"
            default_site = "home"
            sites_dir = "/etc/mkgit"
            interactive = false

            [github]
            api_base = "https://github.example.com/api/v3"

            [gitlab]
            api_scheme = "http"
        "#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_site.as_deref(), Some("home"));
        assert_eq!(config.sites_dir, Some(PathBuf::from("/etc/mkgit")));
        assert_eq!(config.interactive, Some(false));
        assert!(config.validate().is_ok());
    }
}
