//! core
//!
//! Core domain types and the target grammar.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ProjectName, Visibility, TargetDescriptor
//! - [`target`] - TargetResolver and the site-suffix grammar
//! - [`sites`] - Named site discovery and loading
//! - [`visibility`] - Public/private selection from `-p` / `-d`
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Nothing here performs network or process I/O
//! - Schemas are strict; unknown keys are rejected
//! - Ambiguous input is an error, never a guess

pub mod config;
pub mod sites;
pub mod target;
pub mod types;
pub mod visibility;
