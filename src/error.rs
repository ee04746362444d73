//! error
//!
//! Error kinds reported on the command line.
//!
//! Each module has its own `thiserror` enum; [`classify`] walks an
//! `anyhow` chain and maps the first recognized error to one [`ErrorKind`].

use std::fmt;

use crate::core::config::ConfigError;
use crate::core::sites::SiteError;
use crate::core::target::TargetError;
use crate::core::types::TypeError;
use crate::core::visibility::VisibilityError;
use crate::engine::EngineError;
use crate::forge::ForgeError;
use crate::git::GitError;
use crate::secrets::SecretError;
use crate::ui::prompts::PromptError;

/// Terminal error kinds of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadTarget,
    UnknownSite,
    InvalidProjectName,
    UnsupportedBranch,
    ForkMustBePublic,
    UnsupportedOperation,
    MissingCredential,
    RemoteApiFailure,
    RemoteShellFailure,
    PushFailed,
    VisibilityConflict,
    VisibilityRequired,
    Config,
    Git,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadTarget => "BadTarget",
            ErrorKind::UnknownSite => "UnknownSite",
            ErrorKind::InvalidProjectName => "InvalidProjectName",
            ErrorKind::UnsupportedBranch => "UnsupportedBranch",
            ErrorKind::ForkMustBePublic => "ForkMustBePublic",
            ErrorKind::UnsupportedOperation => "UnsupportedOperation",
            ErrorKind::MissingCredential => "MissingCredential",
            ErrorKind::RemoteApiFailure => "RemoteApiFailure",
            ErrorKind::RemoteShellFailure => "RemoteShellFailure",
            ErrorKind::PushFailed => "PushFailed",
            ErrorKind::VisibilityConflict => "VisibilityConflict",
            ErrorKind::VisibilityRequired => "VisibilityRequired",
            ErrorKind::Config => "Config",
            ErrorKind::Git => "Git",
            ErrorKind::Io => "Io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of the first recognized error in `err`'s chain.
///
/// Errors from outside the crate (I/O, clap) classify as [`ErrorKind::Io`].
pub fn classify(err: &anyhow::Error) -> ErrorKind {
    err.chain().find_map(kind_of).unwrap_or(ErrorKind::Io)
}

fn kind_of(err: &(dyn std::error::Error + 'static)) -> Option<ErrorKind> {
    if let Some(e) = err.downcast_ref::<EngineError>() {
        return Some(match e {
            EngineError::Target(e) => target_kind(e),
            EngineError::Visibility(e) => visibility_kind(e),
            EngineError::Git(e) => git_kind(e),
            EngineError::Forge(e) => forge_kind(e),
            EngineError::Runtime(_) => ErrorKind::Io,
        });
    }
    if let Some(e) = err.downcast_ref::<TargetError>() {
        return Some(target_kind(e));
    }
    if let Some(e) = err.downcast_ref::<SiteError>() {
        return Some(site_kind(e));
    }
    if let Some(e) = err.downcast_ref::<VisibilityError>() {
        return Some(visibility_kind(e));
    }
    if let Some(e) = err.downcast_ref::<GitError>() {
        return Some(git_kind(e));
    }
    if let Some(e) = err.downcast_ref::<ForgeError>() {
        return Some(forge_kind(e));
    }
    if let Some(e) = err.downcast_ref::<SecretError>() {
        return Some(secret_kind(e));
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return Some(ErrorKind::Config);
    }
    if let Some(e) = err.downcast_ref::<TypeError>() {
        return Some(match e {
            TypeError::InvalidProjectName(_) => ErrorKind::InvalidProjectName,
        });
    }
    if err.downcast_ref::<PromptError>().is_some() {
        return Some(ErrorKind::MissingCredential);
    }
    None
}

fn target_kind(e: &TargetError) -> ErrorKind {
    match e {
        TargetError::BadTarget { .. } => ErrorKind::BadTarget,
        TargetError::Site(e) => site_kind(e),
    }
}

fn site_kind(e: &SiteError) -> ErrorKind {
    match e {
        SiteError::UnknownSite { .. } => ErrorKind::UnknownSite,
        SiteError::ReadError { .. } | SiteError::ParseError { .. } => ErrorKind::Config,
    }
}

fn visibility_kind(e: &VisibilityError) -> ErrorKind {
    match e {
        VisibilityError::Conflict => ErrorKind::VisibilityConflict,
        VisibilityError::Required(_) => ErrorKind::VisibilityRequired,
    }
}

fn git_kind(e: &GitError) -> ErrorKind {
    match e {
        GitError::UnsupportedBranch { .. } | GitError::NoBranch | GitError::EmptyBranch { .. } => {
            ErrorKind::UnsupportedBranch
        }
        GitError::PushFailed { .. } => ErrorKind::PushFailed,
        _ => ErrorKind::Git,
    }
}

fn forge_kind(e: &ForgeError) -> ErrorKind {
    match e {
        ForgeError::InvalidProjectName(_) => ErrorKind::InvalidProjectName,
        ForgeError::ForkMustBePublic => ErrorKind::ForkMustBePublic,
        ForgeError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
        ForgeError::IncompleteTarget(_) => ErrorKind::BadTarget,
        ForgeError::Credentials(e) => secret_kind(e),
        ForgeError::AuthFailed(_)
        | ForgeError::NotFound(_)
        | ForgeError::ApiError { .. }
        | ForgeError::NetworkError(_) => ErrorKind::RemoteApiFailure,
        ForgeError::RemoteShellFailure { .. } => ErrorKind::RemoteShellFailure,
    }
}

fn secret_kind(e: &SecretError) -> ErrorKind {
    match e {
        SecretError::Missing { .. } => ErrorKind::MissingCredential,
        _ => ErrorKind::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn classifies_through_context() {
        let err = anyhow::Error::new(EngineError::Git(GitError::UnsupportedBranch {
            branch: "feature-x".into(),
        }))
        .context("creating repository");
        assert_eq!(classify(&err), ErrorKind::UnsupportedBranch);
    }

    #[test]
    fn classifies_forge_errors() {
        let cases = [
            (ForgeError::ForkMustBePublic, ErrorKind::ForkMustBePublic),
            (
                ForgeError::InvalidProjectName("a/b.git".into()),
                ErrorKind::InvalidProjectName,
            ),
            (
                ForgeError::ApiError {
                    status: 500,
                    message: "boom".into(),
                },
                ErrorKind::RemoteApiFailure,
            ),
            (
                ForgeError::Credentials(SecretError::Missing {
                    key: "githubuser".into(),
                    path: "~/.githubuser".into(),
                }),
                ErrorKind::MissingCredential,
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(classify(&anyhow::Error::new(err)), kind);
        }
    }

    #[test]
    fn classifies_push_failure() {
        let result: Result<(), GitError> = Err(GitError::PushFailed {
            remote: "origin".into(),
            branch: "main".into(),
            stderr: "denied".into(),
        });
        let err = result.context("pushing").unwrap_err();
        assert_eq!(classify(&err), ErrorKind::PushFailed);
    }

    #[test]
    fn unknown_errors_are_io() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(classify(&err), ErrorKind::Io);
    }

    #[test]
    fn display_names_match_kinds() {
        assert_eq!(ErrorKind::BadTarget.to_string(), "BadTarget");
        assert_eq!(ErrorKind::PushFailed.to_string(), "PushFailed");
    }
}
