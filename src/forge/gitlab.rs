//! forge::gitlab
//!
//! GitLab provisioner using the v4 REST API.
//!
//! # Design
//!
//! Projects are created with `POST /projects`. When an org is given its
//! namespace id is looked up first (`GET /namespaces/<org>`) and passed as
//! `namespace_id`; otherwise the project lands in the user's namespace.
//! Forking is not supported.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::traits::{ForgeError, ProvisionRequest, Provisioner};
use crate::core::types::ProvisionResult;
use crate::secrets::Credentials;

const USER_AGENT_VALUE: &str = "mkgit";

/// GitLab provisioner for one host.
pub struct GitLabProvisioner {
    client: Client,
    credentials: Credentials,
    /// Host used in push URLs, e.g. `gitlab.com`
    host: String,
    /// e.g. `https://gitlab.com/api/v4`
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitLabProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabProvisioner")
            .field("username", &self.credentials.username)
            .field("host", &self.host)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitLabProvisioner {
    pub fn new(credentials: Credentials, host: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            credentials,
            host: host.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&self.credentials.token)
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert("PRIVATE-TOKEN", token);
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
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

    async fn namespace_id(&self, org: &str) -> Result<u64, ForgeError> {
        let response = self
            .client
            .get(self.endpoint(&["namespaces", org])?)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let namespace: GitLabNamespace = handle_response(response).await?;
        Ok(namespace.id)
    }
}

#[async_trait]
impl Provisioner for GitLabProvisioner {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionResult, ForgeError> {
        if request.fork {
            return Err(ForgeError::UnsupportedOperation(
                "forking is only supported on GitHub".into(),
            ));
        }
        let project = request.flat_project()?;

        let org = request.target.org.as_deref();
        let namespace_id = match org {
            Some(org) => Some(self.namespace_id(org).await?),
            None => None,
        };

        let body = CreateProjectBody {
            name: project.base(),
            path: project.base(),
            visibility: request.visibility.as_str(),
            description: request.description.as_deref(),
            namespace_id,
        };

        let response = self
            .client
            .post(self.endpoint(&["projects"])?)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;
        let _: GitLabProject = handle_response(response).await?;

        let owner = org.unwrap_or(&self.credentials.username);
        Ok(ProvisionResult {
            push_url: format!("ssh://git@{}/{}/{}", self.host, owner, project),
        })
    }
}

async fn handle_response<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ForgeError> {
    let status = response.status();

    if status.is_success() {
        return response.json().await.map_err(|e| ForgeError::ApiError {
            status: status.as_u16(),
            message: format!("Failed to parse response: {}", e),
        });
    }

    let message = match response.json::<GitLabErrorResponse>().await {
        Ok(err) => err.describe(),
        Err(_) => "Unknown error".to_string(),
    };

    Err(match status {
        StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
        StatusCode::FORBIDDEN => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
        StatusCode::NOT_FOUND => ForgeError::NotFound(message),
        _ => ForgeError::ApiError {
            status: status.as_u16(),
            message,
        },
    })
}

// ============================================================================
// GitLab API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateProjectBody<'a> {
    name: &'a str,
    path: &'a str,
    visibility: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GitLabNamespace {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct GitLabProject {
    #[allow(dead_code)]
    id: u64,
}

/// GitLab reports either `message` (a string or a field map) or `error`.
#[derive(Debug, Deserialize)]
struct GitLabErrorResponse {
    message: Option<serde_json::Value>,
    error: Option<String>,
}

impl GitLabErrorResponse {
    fn describe(self) -> String {
        match (self.message, self.error) {
            (Some(serde_json::Value::String(s)), _) => s,
            (Some(serde_json::Value::Object(fields)), _) => fields
                .into_iter()
                .map(|(field, problems)| match problems {
                    serde_json::Value::Array(items) => {
                        let items: Vec<String> = items
                            .iter()
                            .map(|i| i.as_str().map(String::from).unwrap_or_else(|| i.to_string()))
                            .collect();
                        format!("{} {}", field, items.join(", "))
                    }
                    other => format!("{} {}", field, other),
                })
                .collect::<Vec<_>>()
                .join("; "),
            (Some(other), _) => other.to_string(),
            (None, Some(e)) => e,
            (None, None) => "Unknown error".to_string(),
        }
    }
}
