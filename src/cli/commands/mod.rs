//! cli::commands
//!
//! Command handlers.
//!
//! Each handler validates its arguments, calls the engine, and formats
//! output. Handlers do not touch the repository or the network directly.

mod create;
mod list_sites;

pub use create::{create, effective_site};
pub use list_sites::{list_sites, site_lines, HOSTED_PATTERNS};
