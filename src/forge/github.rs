//! forge::github
//!
//! GitHub provisioner using the REST API.
//!
//! # Design
//!
//! Creating a repository is one `POST /user/repos` (own namespace) or
//! `POST /orgs/{org}/repos`. Forking is one `POST /repos/{owner}/{repo}/forks`
//! where the source is derived from the local `origin` remote.
//!
//! The push URL is always the ssh form `ssh://git@github.com/<owner>/<project>`
//! regardless of what the API returns, so the local remote does not depend
//! on API response details.
//!
//! # Example
//!
//! ```ignore
//! use mkgit::forge::github::GitHubProvisioner;
//!
//! let provisioner = GitHubProvisioner::new(credentials);
//! let result = provisioner.provision(&request).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::traits::{ForgeError, ProvisionRequest, Provisioner};
use crate::core::config::DEFAULT_GITHUB_API_BASE;
use crate::core::target::GITHUB_HOST;
use crate::core::types::{ProjectName, ProvisionResult, GIT_SUFFIX};
use crate::secrets::Credentials;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "mkgit";

/// Suffix of the default fork organization, appended to the username.
pub const FORK_ORG_SUFFIX: &str = "-upstream";

/// GitHub provisioner.
pub struct GitHubProvisioner {
    /// HTTP client for making requests
    client: Client,
    credentials: Credentials,
    /// API base URL (configurable for GitHub Enterprise and tests)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubProvisioner")
            .field("username", &self.credentials.username)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubProvisioner {
    /// Create a provisioner against api.github.com.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_api_base(credentials, DEFAULT_GITHUB_API_BASE)
    }

    /// Create a provisioner against a custom API base URL.
    pub fn with_api_base(credentials: Credentials, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            credentials,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.credentials.token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// `{api_base}/<segments...>` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ForgeError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| ForgeError::ApiError {
            status: 0,
            message: format!("invalid API base '{}': {}", self.api_base, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| ForgeError::ApiError {
                status: 0,
                message: format!("invalid API base '{}'", self.api_base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B: Serialize>(&self, segments: &[&str], body: &B) -> Result<GitHubRepository, ForgeError> {
        let response = self
            .client
            .post(self.endpoint(segments)?)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        handle_response(response).await
    }

    async fn create(&self, request: &ProvisionRequest) -> Result<ProvisionResult, ForgeError> {
        let project = request.flat_project()?;
        let body = CreateRepoBody {
            name: project.base(),
            description: request.description.as_deref(),
            private: !request.visibility.is_public(),
        };

        let owner = match request.target.org.as_deref() {
            Some(org) => {
                self.post(&["orgs", org, "repos"], &body).await?;
                org
            }
            None => {
                self.post(&["user", "repos"], &body).await?;
                self.credentials.username.as_str()
            }
        };

        Ok(ProvisionResult {
            push_url: push_url(owner, project.as_str()),
        })
    }

    async fn fork(&self, request: &ProvisionRequest) -> Result<ProvisionResult, ForgeError> {
        if !request.visibility.is_public() {
            return Err(ForgeError::ForkMustBePublic);
        }
        let origin = request.origin_url.as_deref().ok_or_else(|| {
            ForgeError::UnsupportedOperation("fork requires an 'origin' remote".into())
        })?;
        let (source_owner, source_repo) = parse_github_url(origin).ok_or_else(|| {
            ForgeError::UnsupportedOperation(format!(
                "origin '{}' is not a GitHub repository",
                origin
            ))
        })?;

        // The fork keeps the source's name unless one was given.
        let project = if request.target.project_given {
            request.flat_project()?
        } else {
            ProjectName::normalize(&source_repo)
        };

        let org = fork_org(request.target.org.as_deref(), &self.credentials.username);
        if org == source_owner {
            return Err(ForgeError::UnsupportedOperation(format!(
                "cannot fork {}/{} into its own owner",
                source_owner, source_repo
            )));
        }

        let body = ForkBody {
            organization: &org,
            name: project.base(),
            default_branch_only: false,
        };
        self.post(&["repos", &source_owner, &source_repo, "forks"], &body)
            .await?;

        Ok(ProvisionResult {
            push_url: push_url(&org, project.as_str()),
        })
    }
}

#[async_trait]
impl Provisioner for GitHubProvisioner {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionResult, ForgeError> {
        if request.fork {
            self.fork(request).await
        } else {
            self.create(request).await
        }
    }
}

/// Organization a fork lands in.
///
/// An explicit org wins; otherwise `<username>-upstream`.
pub fn fork_org(configured: Option<&str>, username: &str) -> String {
    match configured {
        Some(org) => org.to_string(),
        None => format!("{}{}", username, FORK_ORG_SUFFIX),
    }
}

/// Push URL for `project` (already normalized) under `owner`.
pub fn push_url(owner: &str, project: &str) -> String {
    format!("ssh://git@{}/{}/{}", GITHUB_HOST, owner, project)
}

/// Handle API response, mapping errors appropriately.
async fn handle_response<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ForgeError> {
    let status = response.status();

    if status.is_success() {
        return response.json().await.map_err(|e| ForgeError::ApiError {
            status: status.as_u16(),
            message: format!("Failed to parse response: {}", e),
        });
    }

    // Try to get error message from body
    let message = match response.json::<GitHubErrorResponse>().await {
        Ok(err) => err.describe(),
        Err(_) => "Unknown error".to_string(),
    };

    Err(match status {
        StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
        StatusCode::FORBIDDEN => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
        StatusCode::NOT_FOUND => ForgeError::NotFound(message),
        _ if status.is_server_error() => ForgeError::ApiError {
            status: status.as_u16(),
            message: format!("GitHub server error: {}", message),
        },
        _ => ForgeError::ApiError {
            status: status.as_u16(),
            message,
        },
    })
}

// ============================================================================
// GitHub API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    private: bool,
}

#[derive(Debug, Serialize)]
struct ForkBody<'a> {
    organization: &'a str,
    name: &'a str,
    default_branch_only: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubRepository {
    #[allow(dead_code)]
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorResponse {
    message: String,
    #[serde(default)]
    errors: Vec<GitHubFieldError>,
}

#[derive(Debug, Deserialize)]
struct GitHubFieldError {
    message: Option<String>,
}

impl GitHubErrorResponse {
    fn describe(self) -> String {
        let details: Vec<String> = self.errors.into_iter().filter_map(|e| e.message).collect();
        if details.is_empty() {
            self.message
        } else {
            format!("{} ({})", self.message, details.join("; "))
        }
    }
}

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports scp-like (`git@github.com:owner/repo.git`), ssh
/// (`ssh://git@github.com/owner/repo.git`) and HTTPS forms.
///
/// # Example
///
/// ```
/// use mkgit::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:octocat/hello-world.git").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;

    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(GIT_SUFFIX).unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_github_url {
        use super::*;

        #[test]
        fn scp_form() {
            assert_eq!(
                parse_github_url("git@github.com:owner/repo.git"),
                Some(("owner".into(), "repo".into()))
            );
        }

        #[test]
        fn ssh_form() {
            assert_eq!(
                parse_github_url("ssh://git@github.com/owner/repo.git"),
                Some(("owner".into(), "repo".into()))
            );
        }

        #[test]
        fn https_without_git_suffix() {
            assert_eq!(
                parse_github_url("https://github.com/owner/repo"),
                Some(("owner".into(), "repo".into()))
            );
        }

        #[test]
        fn repo_with_dots() {
            assert_eq!(
                parse_github_url("https://github.com/owner/repo.js.git"),
                Some(("owner".into(), "repo.js".into()))
            );
        }

        #[test]
        fn non_github_url() {
            assert_eq!(parse_github_url("git@gitlab.com:owner/repo.git"), None);
        }

        #[test]
        fn nested_path_rejected() {
            assert_eq!(parse_github_url("https://github.com/owner/repo/tree"), None);
        }
    }

    mod fork_org {
        use super::*;

        #[test]
        fn explicit_org_wins() {
            assert_eq!(fork_org(Some("acme"), "alice"), "acme");
        }

        #[test]
        fn defaults_to_upstream_suffix() {
            assert_eq!(fork_org(None, "alice"), "alice-upstream");
        }
    }

    #[test]
    fn push_url_format() {
        assert_eq!(
            push_url("acme", "tool.git"),
            "ssh://git@github.com/acme/tool.git"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let p = GitHubProvisioner::new(Credentials {
            username: "alice".into(),
            token: "ghp_secret_xyz".into(),
        });
        let debug = format!("{:?}", p);
        assert!(!debug.contains("ghp_secret_xyz"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn api_base_trailing_slash_trimmed() {
        let p = GitHubProvisioner::with_api_base(
            Credentials {
                username: "alice".into(),
                token: "t".into(),
            },
            "http://127.0.0.1:9/",
        );
        assert_eq!(p.api_base, "http://127.0.0.1:9");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let p = GitHubProvisioner::with_api_base(
            Credentials {
                username: "alice".into(),
                token: "t".into(),
            },
            "https://ghe.example.com/api/v3",
        );
        assert_eq!(
            p.endpoint(&["orgs", "acme/../admin", "repos"]).unwrap().as_str(),
            "https://ghe.example.com/api/v3/orgs/acme%2F..%2Fadmin/repos"
        );
        assert_eq!(
            p.endpoint(&["user", "repos"]).unwrap().as_str(),
            "https://ghe.example.com/api/v3/user/repos"
        );
    }

    #[test]
    fn error_response_includes_field_errors() {
        let err: GitHubErrorResponse = serde_json::from_str(
            r#"{"message":"Repository creation failed.","errors":[{"resource":"Repository","message":"name already exists on this account"}]}"#,
        )
        .unwrap();
        assert_eq!(
            err.describe(),
            "Repository creation failed. (name already exists on this account)"
        );
    }
}
