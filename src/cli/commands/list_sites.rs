//! cli::commands::list_sites
//!
//! `mkgit --list-sites`.

use anyhow::Result;

use crate::core::sites::SiteRegistry;

/// Keyword patterns for the hosted services, shown before named sites.
pub const HOSTED_PATTERNS: [&str; 2] = ["github-<org>", "gitlab[-host][-org]"];

/// Lines printed by `--list-sites`.
pub fn site_lines(sites: &SiteRegistry) -> Vec<String> {
    HOSTED_PATTERNS
        .iter()
        .copied()
        .chain(sites.list_sites())
        .map(String::from)
        .collect()
}

/// Print every site keyword.
pub fn list_sites(sites: &SiteRegistry) -> Result<()> {
    for line in site_lines(sites) {
        println!("{}", line);
    }
    Ok(())
}
