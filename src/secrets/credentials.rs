//! secrets::credentials
//!
//! Username/token pairs for the hosted services.
//!
//! GitHub credentials must already exist. GitLab credentials are keyed by
//! host and, in interactive sessions, are requested and stored on first
//! use.

use super::traits::{SecretError, SecretStore};
use crate::ui::prompts::{PromptError, Prompter};

/// Key of the GitHub username.
pub const GITHUB_USER_KEY: &str = "githubuser";

/// Key of the GitHub OAuth / personal access token.
pub const GITHUB_TOKEN_KEY: &str = "github-oauthtoken";

/// Key of the GitLab username for `host`.
pub fn gitlab_user_key(host: &str) -> String {
    format!("gitlabuser-{}", host)
}

/// Key of the GitLab token for `host`.
pub fn gitlab_token_key(host: &str) -> String {
    format!("gitlab-token-{}", host)
}

/// A username and its API token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Load GitHub credentials.
///
/// # Errors
///
/// [`SecretError::Missing`] if either file is absent.
pub fn github(store: &dyn SecretStore) -> Result<Credentials, SecretError> {
    Ok(Credentials {
        username: store.require(GITHUB_USER_KEY)?,
        token: store.require(GITHUB_TOKEN_KEY)?,
    })
}

/// Load GitLab credentials for `host`, creating them interactively if needed.
///
/// Without a prompter (non-interactive sessions) a missing credential is an
/// error.
pub fn gitlab(
    store: &dyn SecretStore,
    host: &str,
    prompter: Option<&dyn Prompter>,
) -> Result<Credentials, SecretError> {
    let user_key = gitlab_user_key(host);
    let token_key = gitlab_token_key(host);

    let username = match (store.get(&user_key)?, prompter) {
        (Some(u), _) => u,
        (None, Some(p)) => {
            let u = ask(p.input(&format!("GitLab username on {}", host)), &user_key)?;
            store.set(&user_key, &u)?;
            u
        }
        (None, None) => return Err(missing(store, &user_key)),
    };

    let token = match (store.get(&token_key)?, prompter) {
        (Some(t), _) => t,
        (None, Some(p)) => {
            let t = ask(
                p.password(&format!(
                    "GitLab personal access token for {} on {} (scope: api)",
                    username, host
                )),
                &token_key,
            )?;
            store.set(&token_key, &t)?;
            t
        }
        (None, None) => return Err(missing(store, &token_key)),
    };

    Ok(Credentials { username, token })
}

fn missing(store: &dyn SecretStore, key: &str) -> SecretError {
    SecretError::Missing {
        key: key.to_string(),
        path: store.location(key),
    }
}

fn ask(answer: Result<String, PromptError>, key: &str) -> Result<String, SecretError> {
    let value = answer.map_err(|e| SecretError::ReadError(format!("{}: {}", key, e)))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(SecretError::ReadError(format!("{}: empty answer", key)));
    }
    Ok(value)
}
