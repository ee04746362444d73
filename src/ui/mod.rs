//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive prompts for credentials
//! - [`output`] - Output formatting and display
//!
//! All output and prompts go through this module so quiet and
//! non-interactive modes are honored in one place.

pub mod output;
pub mod prompts;
