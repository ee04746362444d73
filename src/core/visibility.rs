//! core::visibility
//!
//! Selecting public or private from the `-p` / `-d` flags.
//!
//! Exactly one of the two flags picks the visibility. When neither is
//! given, hosted services default to public and a named site may supply
//! its own default; raw SSH targets require an explicit choice.

use thiserror::Error;

use super::types::{TargetDescriptor, Visibility};

/// Errors from visibility selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VisibilityError {
    #[error("public/private conflict: a description (-d) makes the repository public, but -p asks for private")]
    Conflict,

    #[error("{0} targets need an explicit visibility: pass -p for private or -d <description> for public")]
    Required(String),
}

/// Visibility and description chosen for an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityChoice {
    pub visibility: Visibility,
    /// Explicit description, if one was given.
    pub description: Option<String>,
}

/// Pick the visibility for `target` from the command-line flags.
pub fn select(
    private: bool,
    description: Option<&str>,
    target: &TargetDescriptor,
) -> Result<VisibilityChoice, VisibilityError> {
    let description = description.map(String::from);
    let visibility = match (private, &description) {
        (true, Some(_)) => return Err(VisibilityError::Conflict),
        (true, None) => Visibility::Private,
        (false, Some(_)) => Visibility::Public,
        (false, None) if target.service.is_hosted() => Visibility::Public,
        (false, None) => match target.site_visibility {
            Some(v) => v,
            None => return Err(VisibilityError::Required(target.service.to_string())),
        },
    };

    Ok(VisibilityChoice {
        visibility,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Service;

    fn target(service: Service) -> TargetDescriptor {
        let mut t = TargetDescriptor::new("/work/widget");
        t.service = service;
        t.project = "widget".into();
        t
    }

    #[test]
    fn both_flags_conflict() {
        let result = select(true, Some("desc"), &target(Service::GitHub));
        assert_eq!(result, Err(VisibilityError::Conflict));
    }

    #[test]
    fn private_flag() {
        let choice = select(true, None, &target(Service::RawSsh)).unwrap();
        assert_eq!(choice.visibility, Visibility::Private);
        assert!(choice.description.is_none());
    }

    #[test]
    fn description_means_public() {
        let choice = select(false, Some("A widget"), &target(Service::NamedSite)).unwrap();
        assert_eq!(choice.visibility, Visibility::Public);
        assert_eq!(choice.description.as_deref(), Some("A widget"));
    }

    #[test]
    fn hosted_defaults_public() {
        let choice = select(false, None, &target(Service::GitLab)).unwrap();
        assert_eq!(choice.visibility, Visibility::Public);
        assert!(choice.description.is_none());
    }

    #[test]
    fn raw_ssh_requires_choice() {
        let result = select(false, None, &target(Service::RawSsh));
        assert!(matches!(result, Err(VisibilityError::Required(_))));
    }

    #[test]
    fn site_default_applies() {
        let mut t = target(Service::NamedSite);
        t.site_visibility = Some(Visibility::Private);
        let choice = select(false, None, &t).unwrap();
        assert_eq!(choice.visibility, Visibility::Private);
    }

    #[test]
    fn flag_overrides_site_default() {
        let mut t = target(Service::NamedSite);
        t.site_visibility = Some(Visibility::Private);
        let choice = select(false, Some("public now"), &t).unwrap();
        assert_eq!(choice.visibility, Visibility::Public);
    }

    #[test]
    fn named_site_without_default_requires_choice() {
        let result = select(false, None, &target(Service::NamedSite));
        assert_eq!(result, Err(VisibilityError::Required("site".into())));
    }
}
