//! core::target
//!
//! Resolution of the command-line target into a [`TargetDescriptor`].
//!
//! # Grammar
//!
//! The target comes from two places: the `-X` keyword and the positional
//! target argument.
//!
//! - No keyword: the positional target must be an SSH locator,
//!   `ssh://[user@]host/parent/.../project[.git]`.
//! - `github[-org]`: the whole suffix after the first hyphen is the
//!   organization, hyphens and dots included.
//! - `gitlab[...]`: see [`parse_gitlab_suffix`].
//! - Anything else must name a registered site.
//!
//! # GitLab suffix precedence
//!
//! The suffix after `gitlab` is tokenized on its first hyphen:
//!
//! 1. Suffix starts with `.` (shorthand, `gitlab.example.com-acme`): the
//!    keyword is part of the hostname. Host is `gitlab` plus everything up
//!    to the first hyphen; the remainder is the organization.
//! 2. Suffix starts with `-` and the first hyphen-delimited token contains
//!    a `.` (`gitlab-git.example.com-acme`): that token is the host; the
//!    remainder is the organization.
//! 3. Suffix starts with `-` and contains no `.` at all (`gitlab-acme`):
//!    the whole suffix is the organization on the default host.
//!
//! Anything else (a `.` that only appears after the first hyphen, as in
//! `gitlab-my-git.example.com`) is ambiguous between a hyphenated host and
//! a dotted organization and is rejected. Hosts with a hyphen before their
//! first dot cannot be spelled with the keyword form; use an `ssh://`
//! locator for those.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::sites::{SiteError, SiteRegistry};
use super::types::{ProjectName, Service, TargetDescriptor};

/// Host used for GitLab when the keyword names none.
pub const DEFAULT_GITLAB_HOST: &str = "gitlab.com";

/// Host of every GitHub repository.
pub const GITHUB_HOST: &str = "github.com";

const GITHUB_KEYWORD: &str = "github";
const GITLAB_KEYWORD: &str = "gitlab";
const SSH_SCHEME: &str = "ssh://";

/// Errors from target resolution.
#[derive(Debug, Error)]
pub enum TargetError {
    /// Malformed or ambiguous target. `raw` is the offending input.
    #[error("bad target '{raw}': {reason}")]
    BadTarget { raw: String, reason: String },

    /// A registered site's file could not be loaded.
    #[error(transparent)]
    Site(#[from] SiteError),
}

impl TargetError {
    fn bad(raw: &str, reason: impl Into<String>) -> Self {
        TargetError::BadTarget {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Host and organization parsed from a `github`/`gitlab` keyword suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSuffix {
    pub host: Option<String>,
    pub org: Option<String>,
}

/// Components of an `ssh://` locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshLocator {
    /// `[user@]host[:port]`
    pub host: String,
    /// Always starts with `/`.
    pub parent_path: String,
    /// Final path segment, with or without `.git`.
    pub project: String,
}

impl SshLocator {
    /// Parse `ssh://[user@]host/parent/.../project[.git]`.
    ///
    /// Returns the reason on failure.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let rest = raw
            .strip_prefix(SSH_SCHEME)
            .ok_or("expected ssh://[user@]host/parent/project[.git] or -X <site>")?;
        let (host, path) = rest.split_once('/').ok_or("missing repository path")?;
        if host.is_empty() {
            return Err("missing host".into());
        }
        check_ssh_host(host)?;
        let (parent, project) = path.rsplit_once('/').ok_or("missing parent path")?;
        if parent.is_empty() {
            return Err("missing parent path".into());
        }
        if ProjectName::normalize(project).base().is_empty() {
            return Err("missing project name".into());
        }

        Ok(Self {
            host: host.to_string(),
            parent_path: format!("/{}", parent),
            project: project.to_string(),
        })
    }

    /// Render back to a locator with a normalized project name.
    pub fn to_url(&self) -> String {
        format!(
            "{}{}{}/{}",
            SSH_SCHEME,
            self.host,
            self.parent_path,
            ProjectName::normalize(&self.project)
        )
    }
}

/// Check an `[user@]host[:port]` value before it reaches `ssh`.
///
/// A leading `-` would be parsed by `ssh` as an option.
pub fn check_ssh_host(host: &str) -> Result<(), String> {
    let name = host.rsplit_once('@').map_or(host, |(_, h)| h);
    if name.is_empty() {
        return Err("missing host".into());
    }
    if host.starts_with('-') || name.starts_with('-') {
        return Err(format!("host '{}' must not start with '-'", host));
    }
    if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!("host '{}' contains whitespace", host));
    }
    Ok(())
}

/// Hosted service selected by a keyword, plus the keyword's suffix.
fn split_hosted_keyword(keyword: &str) -> Option<(Service, &str)> {
    if let Some(rest) = keyword.strip_prefix(GITHUB_KEYWORD) {
        if rest.is_empty() || rest.starts_with('-') {
            return Some((Service::GitHub, rest));
        }
    }
    if let Some(rest) = keyword.strip_prefix(GITLAB_KEYWORD) {
        if rest.is_empty() || rest.starts_with('-') || rest.starts_with('.') {
            return Some((Service::GitLab, rest));
        }
    }
    None
}

/// Whether `keyword` selects GitHub or GitLab rather than a named site.
pub fn is_hosted_keyword(keyword: &str) -> bool {
    split_hosted_keyword(keyword).is_some()
}

/// Parse the suffix following `github`.
///
/// The suffix (without its leading hyphen) is the organization verbatim.
pub fn parse_github_suffix(suffix: &str) -> Result<SiteSuffix, String> {
    if suffix.is_empty() {
        return Ok(SiteSuffix::default());
    }
    let org = suffix
        .strip_prefix('-')
        .ok_or("expected github or github-<org>")?;
    Ok(SiteSuffix {
        host: None,
        org: Some(nonempty_org(org)?),
    })
}

/// Parse the suffix following `gitlab`.
///
/// See the module documentation for the precedence rules.
pub fn parse_gitlab_suffix(suffix: &str) -> Result<SiteSuffix, String> {
    if suffix.is_empty() {
        return Ok(SiteSuffix::default());
    }

    if suffix.starts_with('.') {
        let (host_tail, org) = split_first_hyphen(suffix);
        let host = format!("{}{}", GITLAB_KEYWORD, host_tail);
        validate_hostname(&host)?;
        return Ok(SiteSuffix {
            host: Some(host),
            org: org.map(nonempty_org).transpose()?,
        });
    }

    let body = suffix
        .strip_prefix('-')
        .ok_or("expected gitlab[-host][-org] or gitlab.<domain>[-org]")?;
    if body.is_empty() {
        return Err("empty organization".into());
    }

    let (first, rest) = split_first_hyphen(body);
    if first.contains('.') {
        validate_hostname(first)?;
        return Ok(SiteSuffix {
            host: Some(first.to_string()),
            org: rest.map(nonempty_org).transpose()?,
        });
    }
    if body.contains('.') {
        return Err(format!(
            "ambiguous suffix '{}': a host must contain a '.' before any '-'; \
             use an ssh:// target for hosts with hyphens",
            body
        ));
    }

    Ok(SiteSuffix {
        host: None,
        org: Some(body.to_string()),
    })
}

fn split_first_hyphen(s: &str) -> (&str, Option<&str>) {
    match s.split_once('-') {
        Some((head, tail)) => (head, Some(tail)),
        None => (s, None),
    }
}

fn nonempty_org(org: &str) -> Result<String, String> {
    if org.is_empty() {
        Err("empty organization".into())
    } else {
        Ok(org.to_string())
    }
}

/// Check `host` looks like a DNS name: dotted, non-empty alphanumeric labels.
fn validate_hostname(host: &str) -> Result<(), String> {
    let well_formed = host.contains('.')
        && host
            .split('.')
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric()));
    if well_formed {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid host name", host))
    }
}

/// Resolves `-X` and the positional target into a [`TargetDescriptor`].
#[derive(Debug)]
pub struct TargetResolver<'a> {
    sites: &'a SiteRegistry,
    source_dir: PathBuf,
}

impl<'a> TargetResolver<'a> {
    /// Create a resolver for the repository at `source_dir`.
    ///
    /// `source_dir` also supplies the default project name.
    pub fn new(sites: &'a SiteRegistry, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            sites,
            source_dir: source_dir.into(),
        }
    }

    /// Resolve a target.
    ///
    /// `arg_count` is the number of positional arguments given. When it is
    /// zero and `positional` is absent, the project defaults to the base
    /// name of the source directory.
    ///
    /// # Errors
    ///
    /// - [`TargetError::BadTarget`] for malformed or ambiguous input,
    ///   including keywords that name no registered site
    /// - [`TargetError::Site`] if a registered site file cannot be loaded
    pub fn resolve(
        &self,
        x_keyword: Option<&str>,
        positional: Option<&str>,
        arg_count: usize,
    ) -> Result<TargetDescriptor, TargetError> {
        let target = match positional {
            Some(t) if t.is_empty() => return Err(TargetError::bad(t, "empty target")),
            Some(t) => t.to_string(),
            None if arg_count == 0 => default_project(&self.source_dir)?,
            None => return Err(TargetError::bad("", "missing target")),
        };

        let mut desc = TargetDescriptor::new(self.source_dir.clone());
        desc.project_given = positional.is_some();

        let Some(keyword) = x_keyword else {
            let locator = SshLocator::parse(&target).map_err(|r| TargetError::bad(&target, r))?;
            desc.service = Service::RawSsh;
            desc.host = Some(locator.host);
            desc.parent_path = Some(locator.parent_path);
            desc.project = locator.project;
            return Ok(desc);
        };

        desc.project = target;

        if let Some((service, suffix)) = split_hosted_keyword(keyword) {
            let parsed = match service {
                Service::GitHub => parse_github_suffix(suffix),
                _ => parse_gitlab_suffix(suffix),
            }
            .map_err(|r| TargetError::bad(keyword, r))?;

            desc.service = service;
            desc.org = parsed.org;
            desc.host = match service {
                Service::GitLab => Some(
                    parsed
                        .host
                        .unwrap_or_else(|| DEFAULT_GITLAB_HOST.to_string()),
                ),
                _ => None,
            };
            return Ok(desc);
        }

        if !self.sites.contains(keyword) {
            let known = self.sites.list_sites();
            let reason = if known.is_empty() {
                "unknown site (no sites configured)".to_string()
            } else {
                format!("unknown site (known sites: {})", known.join(", "))
            };
            return Err(TargetError::bad(keyword, reason));
        }

        let site = self.sites.load_site(keyword)?;
        check_ssh_host(&site.host).map_err(|r| TargetError::bad(keyword, r))?;
        desc.service = Service::NamedSite;
        desc.host = Some(site.host);
        desc.parent_path = Some(site.parent_path);
        desc.repo_link_dir = site.repo_link_dir;
        desc.site_visibility = site.visibility;
        Ok(desc)
    }
}

fn default_project(source_dir: &Path) -> Result<String, TargetError> {
    source_dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .ok_or_else(|| {
            TargetError::bad(
                &source_dir.display().to_string(),
                "cannot derive a project name from this directory",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn empty() -> SiteRegistry {
        SiteRegistry::empty()
    }

    fn bad_reason(result: Result<TargetDescriptor, TargetError>) -> (String, String) {
        match result {
            Err(TargetError::BadTarget { raw, reason }) => (raw, reason),
            other => panic!("expected BadTarget, got {:?}", other),
        }
    }

    mod ssh_locator {
        use super::*;

        #[test]
        fn parses_full_locator() {
            let loc = SshLocator::parse("ssh://git@example.org/srv/git/widget.git").unwrap();
            assert_eq!(loc.host, "git@example.org");
            assert_eq!(loc.parent_path, "/srv/git");
            assert_eq!(loc.project, "widget.git");
        }

        #[test]
        fn project_without_suffix() {
            let loc = SshLocator::parse("ssh://example.org/a/b/c/widget").unwrap();
            assert_eq!(loc.parent_path, "/a/b/c");
            assert_eq!(loc.project, "widget");
            assert_eq!(loc.to_url(), "ssh://example.org/a/b/c/widget.git");
        }

        #[test]
        fn rejects_missing_pieces() {
            assert!(SshLocator::parse("ssh://example.org").is_err());
            assert!(SshLocator::parse("ssh:///srv/widget.git").is_err());
            assert!(SshLocator::parse("ssh://example.org/widget.git").is_err());
            assert!(SshLocator::parse("ssh://example.org/srv/").is_err());
            assert!(SshLocator::parse("ssh://example.org/srv/.git").is_err());
            assert!(SshLocator::parse("git@example.org:srv/widget.git").is_err());
        }

        #[test]
        fn rejects_option_like_host() {
            for raw in [
                "ssh://-oProxyCommand=touch${IFS}/tmp/pwned/srv/tool.git",
                "ssh://git@-oProxyCommand=id/srv/tool.git",
                "ssh://-p2222/srv/tool.git",
            ] {
                let err = SshLocator::parse(raw).unwrap_err();
                assert!(err.contains("must not start with '-'"), "{}: {}", raw, err);
            }
        }
    }

    #[test]
    fn check_ssh_host_accepts_user_and_port() {
        assert!(check_ssh_host("git@example.org:2222").is_ok());
        assert!(check_ssh_host("example.org").is_ok());
        assert!(check_ssh_host("git@").is_err());
        assert!(check_ssh_host("exa mple.org").is_err());
    }

    mod gitlab_suffix {
        use super::*;

        #[test]
        fn none() {
            assert_eq!(parse_gitlab_suffix("").unwrap(), SiteSuffix::default());
        }

        #[test]
        fn pure_org() {
            let s = parse_gitlab_suffix("-acme").unwrap();
            assert_eq!(s.host, None);
            assert_eq!(s.org.as_deref(), Some("acme"));
        }

        #[test]
        fn hyphenated_org() {
            let s = parse_gitlab_suffix("-acme-labs").unwrap();
            assert_eq!(s.org.as_deref(), Some("acme-labs"));
        }

        #[test]
        fn explicit_host_and_org() {
            let s = parse_gitlab_suffix("-git.example.com-acme").unwrap();
            assert_eq!(s.host.as_deref(), Some("git.example.com"));
            assert_eq!(s.org.as_deref(), Some("acme"));
        }

        #[test]
        fn explicit_host_only() {
            let s = parse_gitlab_suffix("-git.example.com").unwrap();
            assert_eq!(s.host.as_deref(), Some("git.example.com"));
            assert_eq!(s.org, None);
        }

        #[test]
        fn shorthand_host_and_org() {
            let s = parse_gitlab_suffix(".example.com-acme").unwrap();
            assert_eq!(s.host.as_deref(), Some("gitlab.example.com"));
            assert_eq!(s.org.as_deref(), Some("acme"));
        }

        #[test]
        fn shorthand_host_only() {
            let s = parse_gitlab_suffix(".cs.example.edu").unwrap();
            assert_eq!(s.host.as_deref(), Some("gitlab.cs.example.edu"));
            assert_eq!(s.org, None);
        }

        #[test]
        fn ambiguous_hyphenated_host_rejected() {
            let err = parse_gitlab_suffix("-my-git.example.com").unwrap_err();
            assert!(err.contains("ambiguous"));
        }

        #[test]
        fn empty_org_rejected() {
            assert!(parse_gitlab_suffix("-").is_err());
            assert!(parse_gitlab_suffix("-git.example.com-").is_err());
            assert!(parse_gitlab_suffix(".example.com-").is_err());
        }

        #[test]
        fn malformed_host_rejected() {
            assert!(parse_gitlab_suffix("-git..example.com").is_err());
            assert!(parse_gitlab_suffix(".").is_err());
            assert!(parse_gitlab_suffix("-.example.com").is_err());
        }
    }

    mod github_suffix {
        use super::*;

        #[test]
        fn none() {
            assert_eq!(parse_github_suffix("").unwrap(), SiteSuffix::default());
        }

        #[test]
        fn org_is_verbatim() {
            let s = parse_github_suffix("-acme-labs.io").unwrap();
            assert_eq!(s.org.as_deref(), Some("acme-labs.io"));
            assert_eq!(s.host, None);
        }

        #[test]
        fn empty_org_rejected() {
            assert!(parse_github_suffix("-").is_err());
        }
    }

    mod keywords {
        use super::*;

        #[test]
        fn hosted_keywords() {
            assert!(is_hosted_keyword("github"));
            assert!(is_hosted_keyword("github-acme"));
            assert!(is_hosted_keyword("gitlab"));
            assert!(is_hosted_keyword("gitlab-acme"));
            assert!(is_hosted_keyword("gitlab.example.com"));
        }

        #[test]
        fn lookalikes_are_sites() {
            assert!(!is_hosted_keyword("githubber"));
            assert!(!is_hosted_keyword("gitlabs"));
            assert!(!is_hosted_keyword("GitHub"));
            assert!(!is_hosted_keyword("github.com"));
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn github_with_org() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let d = r.resolve(Some("github-acme"), Some("foo"), 1).unwrap();
            assert_eq!(d.service, Service::GitHub);
            assert_eq!(d.org.as_deref(), Some("acme"));
            assert_eq!(d.project, "foo");
            assert!(d.project_given);
            assert_eq!(d.host, None);
        }

        #[test]
        fn gitlab_defaults_host() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let d = r.resolve(Some("gitlab"), Some("foo.git"), 1).unwrap();
            assert_eq!(d.service, Service::GitLab);
            assert_eq!(d.host.as_deref(), Some(DEFAULT_GITLAB_HOST));
            assert_eq!(d.org, None);
        }

        #[test]
        fn gitlab_explicit_host_and_org() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let d = r
                .resolve(Some("gitlab-git.example.com-acme"), Some("foo"), 1)
                .unwrap();
            assert_eq!(d.service, Service::GitLab);
            assert_eq!(d.host.as_deref(), Some("git.example.com"));
            assert_eq!(d.org.as_deref(), Some("acme"));
        }

        #[test]
        fn gitlab_shorthand_matches_explicit_form() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let short = r
                .resolve(Some("gitlab.example.com-acme"), Some("foo"), 1)
                .unwrap();
            let explicit = r
                .resolve(Some("gitlab-gitlab.example.com-acme"), Some("foo"), 1)
                .unwrap();
            assert_eq!(short, explicit);
        }

        #[test]
        fn defaults_project_to_directory_name() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/widget");
            let d = r.resolve(Some("github"), None, 0).unwrap();
            assert_eq!(d.project, "widget");
            assert!(!d.project_given);
            assert_eq!(d.source_dir, PathBuf::from("/work/widget"));
        }

        #[test]
        fn raw_ssh() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let d = r
                .resolve(None, Some("ssh://me@host.example/srv/git/foo.git"), 1)
                .unwrap();
            assert_eq!(d.service, Service::RawSsh);
            assert_eq!(d.host.as_deref(), Some("me@host.example"));
            assert_eq!(d.parent_path.as_deref(), Some("/srv/git"));
            assert_eq!(d.project, "foo.git");
        }

        #[test]
        fn no_keyword_requires_ssh_locator() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let (raw, _) = bad_reason(r.resolve(None, Some("foo"), 1));
            assert_eq!(raw, "foo");
        }

        #[test]
        fn no_keyword_no_args_fails_on_default() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let (raw, _) = bad_reason(r.resolve(None, None, 0));
            assert_eq!(raw, "foo");
        }

        #[test]
        fn unknown_site_is_bad_target() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let (raw, reason) = bad_reason(r.resolve(Some("home"), Some("foo"), 1));
            assert_eq!(raw, "home");
            assert!(reason.contains("unknown site"));
        }

        #[test]
        fn ambiguous_gitlab_is_bad_target() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let (raw, _) = bad_reason(r.resolve(Some("gitlab-my-git.example.com"), Some("x"), 1));
            assert_eq!(raw, "gitlab-my-git.example.com");
        }

        #[test]
        fn named_site() {
            let temp = TempDir::new().unwrap();
            fs::write(
                temp.path().join("site-home.toml"),
                "host = \"git@home.example\"\nparent_path = \"/srv/git\"\nrepo_link_dir = \"/srv/pub\"\n",
            )
            .unwrap();
            let sites = SiteRegistry::discover(temp.path()).unwrap();
            let r = TargetResolver::new(&sites, "/work/foo");

            let d = r.resolve(Some("home"), Some("foo"), 1).unwrap();
            assert_eq!(d.service, Service::NamedSite);
            assert_eq!(d.host.as_deref(), Some("git@home.example"));
            assert_eq!(d.parent_path.as_deref(), Some("/srv/git"));
            assert_eq!(d.repo_link_dir.as_deref(), Some("/srv/pub"));
            assert_eq!(d.project, "foo");
            assert_eq!(d.org, None);
        }

        #[test]
        fn broken_site_file_surfaces_site_error() {
            let temp = TempDir::new().unwrap();
            fs::write(temp.path().join("site-home.toml"), "host = ").unwrap();
            let sites = SiteRegistry::discover(temp.path()).unwrap();
            let r = TargetResolver::new(&sites, "/work/foo");

            assert!(matches!(
                r.resolve(Some("home"), Some("foo"), 1),
                Err(TargetError::Site(SiteError::ParseError { .. }))
            ));
        }

        #[test]
        fn option_like_site_host_is_bad_target() {
            let temp = TempDir::new().unwrap();
            fs::write(
                temp.path().join("site-evil.toml"),
                "host = \"-oProxyCommand=id\"\nparent_path = \"/srv/git\"\n",
            )
            .unwrap();
            let sites = SiteRegistry::discover(temp.path()).unwrap();
            let r = TargetResolver::new(&sites, "/work/foo");

            let (raw, reason) = bad_reason(r.resolve(Some("evil"), Some("foo"), 1));
            assert_eq!(raw, "evil");
            assert!(reason.contains("must not start with '-'"));
        }

        #[test]
        fn option_like_raw_host_is_bad_target() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            let (raw, _) = bad_reason(r.resolve(
                None,
                Some("ssh://-oProxyCommand=touch${IFS}/tmp/pwned/srv/tool.git"),
                1,
            ));
            assert!(raw.starts_with("ssh://-o"));
        }

        #[test]
        fn empty_positional_rejected() {
            let sites = empty();
            let r = TargetResolver::new(&sites, "/work/foo");
            assert!(r.resolve(Some("github"), Some(""), 1).is_err());
        }
    }
}
