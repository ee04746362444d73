//! mkgit - create an upstream repository and push to it
//!
//! mkgit creates a remote Git repository in one of four ways (a raw
//! `ssh://` locator, GitHub, GitLab, or a user-defined named site), points
//! the local `origin` at it, and pushes `main` or `master`.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orders resolution, validation, provisioning and linking
//! - [`core`] - Target grammar, project names, sites, visibility, config
//! - [`forge`] - Remote repository creation behind the `Provisioner` trait
//! - [`git`] - Single interface for all local Git operations
//! - [`secrets`] - Credential storage
//! - [`ui`] - Output and prompts
//! - [`error`] - Error kinds reported on the command line
//!
//! # Correctness Invariants
//!
//! 1. Every local check runs before the first remote call
//! 2. Interpolated remote-shell values are always quoted
//! 3. Secrets are never printed

pub mod cli;
pub mod core;
pub mod engine;
pub mod error;
pub mod forge;
pub mod git;
pub mod secrets;
pub mod ui;
