//! forge::ssh
//!
//! Bare repositories on ssh-reachable hosts, for raw `ssh://` locators and
//! named sites.
//!
//! # Design
//!
//! Provisioning is a single shell script executed on the remote host
//! through a [`RemoteShell`]. Every interpolated value is single-quoted
//! with [`shell_quote`], so project names and paths may contain quotes,
//! `$`, `!` or backslashes without changing the script.
//!
//! The script:
//!
//! ```text
//! mkdir -p <parent> && cd <parent> && git init --quiet --bare --shared=group <project>
//!   [&& printf '%s\n' <description> > <project>/description]
//!   [&& touch <project>/git-daemon-export-ok]                 (public only)
//!   [&& ln -s "$PWD"/<project> <link-dir>/<project-leaf>]     (public, link dir set)
//! ```
//!
//! Parent paths that are not absolute (or that start with `~`) are taken
//! relative to the login directory and rendered as `/~/...` in the URL.

use std::process::Command;

use async_trait::async_trait;

use super::traits::{ForgeError, ProvisionRequest, Provisioner};
use crate::core::target::check_ssh_host;
use crate::core::types::{ProvisionResult, Visibility};

/// Marker that lets `git daemon` export a repository.
pub const EXPORT_MARKER: &str = "git-daemon-export-ok";

/// Executes a shell script on a remote host.
pub trait RemoteShell: Send + Sync {
    /// Run `script` on `host` (`[user@]host[:port]`).
    ///
    /// # Errors
    ///
    /// [`ForgeError::RemoteShellFailure`] on a non-zero exit.
    fn run(&self, host: &str, script: &str) -> Result<(), ForgeError>;
}

/// [`RemoteShell`] backed by the local `ssh` binary.
#[derive(Debug, Clone, Default)]
pub struct SshShell;

impl SshShell {
    /// Arguments for `ssh`, splitting a trailing `:port` into `-p`.
    pub fn args(host: &str, script: &str) -> Vec<String> {
        let mut args = Vec::new();
        let target = match host.rsplit_once(':') {
            Some((h, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
                args.push("-p".to_string());
                args.push(port.to_string());
                h
            }
            _ => host,
        };
        args.push(target.to_string());
        args.push("--".to_string());
        args.push(script.to_string());
        args
    }
}

impl RemoteShell for SshShell {
    fn run(&self, host: &str, script: &str) -> Result<(), ForgeError> {
        check_ssh_host(host).map_err(|reason| ForgeError::RemoteShellFailure {
            host: host.to_string(),
            status: "not started".to_string(),
            stderr: reason,
        })?;
        let output = Command::new("ssh")
            .args(Self::args(host, script))
            .output()
            .map_err(|e| ForgeError::RemoteShellFailure {
                host: host.to_string(),
                status: "not started".to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ForgeError::RemoteShellFailure {
                host: host.to_string(),
                status: output
                    .status
                    .code()
                    .map(|c| format!("exit {}", c))
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Quote `s` for a POSIX shell.
///
/// The result is always a single word, even for the empty string.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Where the parent directory lives on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParent {
    /// Path as used in the remote script.
    pub script_path: String,
    /// Path as used in the push URL (always starts with `/`).
    pub url_path: String,
}

impl RemoteParent {
    pub fn new(parent: &str) -> Self {
        let trimmed = parent.trim_end_matches('/');
        let relative = trimmed
            .strip_prefix("/~/")
            .or_else(|| trimmed.strip_prefix("~/"))
            .or_else(|| (trimmed == "~" || trimmed == "/~").then_some(""))
            .or_else(|| (!trimmed.starts_with('/')).then_some(trimmed));

        match relative {
            Some("") => Self {
                script_path: ".".to_string(),
                url_path: "/~".to_string(),
            },
            Some(rel) => Self {
                script_path: rel.to_string(),
                url_path: format!("/~/{}", rel),
            },
            None => Self {
                script_path: trimmed.to_string(),
                url_path: trimmed.to_string(),
            },
        }
    }
}

/// Build the remote provisioning script.
pub fn init_script(
    parent: &RemoteParent,
    project: &str,
    description: Option<&str>,
    visibility: Visibility,
    link_dir: Option<&str>,
) -> String {
    let dir = shell_quote(&parent.script_path);
    let repo = shell_quote(project);

    let mut steps = vec![
        format!("mkdir -p {}", dir),
        format!("cd {}", dir),
        format!("git init --quiet --bare --shared=group {}", repo),
    ];

    if let Some(desc) = description {
        steps.push(format!(
            "printf '%s\\n' {} > {}",
            shell_quote(desc),
            shell_quote(&format!("{}/description", project))
        ));
    }

    if visibility.is_public() {
        steps.push(format!(
            "touch {}",
            shell_quote(&format!("{}/{}", project, EXPORT_MARKER))
        ));
        if let Some(link_dir) = link_dir {
            let leaf = project.rsplit('/').next().unwrap_or(project);
            steps.push(format!(
                "ln -s \"$PWD\"/{} {}",
                repo,
                shell_quote(&format!("{}/{}", link_dir.trim_end_matches('/'), leaf))
            ));
        }
    }

    steps.join(" && ")
}

/// Provisioner for raw `ssh://` targets and named sites.
pub struct ShellProvisioner {
    shell: Box<dyn RemoteShell>,
}

impl std::fmt::Debug for ShellProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellProvisioner").finish_non_exhaustive()
    }
}

impl ShellProvisioner {
    pub fn new(shell: Box<dyn RemoteShell>) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl Provisioner for ShellProvisioner {
    fn name(&self) -> &'static str {
        "ssh"
    }

    async fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionResult, ForgeError> {
        if request.fork {
            return Err(ForgeError::UnsupportedOperation(
                "forking is only supported on GitHub".into(),
            ));
        }

        let target = &request.target;
        let host = target
            .host
            .as_deref()
            .ok_or(ForgeError::IncompleteTarget("host"))?;
        let parent = RemoteParent::new(
            target
                .parent_path
                .as_deref()
                .ok_or(ForgeError::IncompleteTarget("parent path"))?,
        );
        let project = request.project();

        let script = init_script(
            &parent,
            project.as_str(),
            request.description.as_deref(),
            request.visibility,
            target.repo_link_dir.as_deref(),
        );
        self.shell.run(host, &script)?;

        Ok(ProvisionResult {
            push_url: format!("ssh://{}{}/{}", host, parent.url_path, project),
        })
    }
}
