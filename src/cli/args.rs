//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! ```text
//! mkgit [-p | -d <desc>] [-X <site>] [-F] [project[.git] | ssh://host/path/project[.git]] [source-dir]
//! mkgit --list-sites
//! ```

use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

/// mkgit - create an upstream repository and push to it
#[derive(Parser, Debug)]
#[command(name = "mkgit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Create a private repository
    #[arg(short = 'p', long)]
    pub private: bool,

    /// Create a public repository with this description
    #[arg(short = 'd', long, value_name = "DESC")]
    pub description: Option<String>,

    /// Site keyword: github[-org], gitlab[-host][-org], or a named site
    #[arg(short = 'X', long, value_name = "SITE")]
    pub site: Option<String>,

    /// Fork the repository `origin` points at (GitHub only)
    #[arg(short = 'F', long)]
    pub fork: bool,

    /// Directory on the remote host to link public repositories into
    #[arg(long, value_name = "DIR")]
    pub repo_link: Option<String>,

    /// List available site keywords and exit
    #[arg(long)]
    pub list_sites: bool,

    /// Directory holding named site files
    #[arg(long, value_name = "DIR")]
    pub sites_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_interactive: bool,

    /// Project name, or an ssh:// locator when no site is given
    #[arg(value_name = "PROJECT")]
    pub project: Option<String>,

    /// Local repository to push (defaults to the current directory)
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Number of positional arguments given.
    pub fn arg_count(&self) -> usize {
        usize::from(self.project.is_some()) + usize::from(self.source_dir.is_some())
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true unless `--no-interactive` or `--quiet` was set, the
    /// config disables prompts, or stdin is not a terminal.
    pub fn interactive(&self, config_allows: bool) -> bool {
        !self.no_interactive && !self.quiet && config_allows && std::io::stdin().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mkgit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_hosted_invocation() {
        let cli = parse(&["-X", "gitlab-acme", "-d", "A tool", "tool"]);
        assert_eq!(cli.site.as_deref(), Some("gitlab-acme"));
        assert_eq!(cli.description.as_deref(), Some("A tool"));
        assert_eq!(cli.project.as_deref(), Some("tool"));
        assert_eq!(cli.arg_count(), 1);
    }

    #[test]
    fn parses_source_dir() {
        let cli = parse(&["-p", "ssh://h/srv/tool.git", "/tmp/tool"]);
        assert!(cli.private);
        assert_eq!(cli.source_dir, Some(PathBuf::from("/tmp/tool")));
        assert_eq!(cli.arg_count(), 2);
    }

    #[test]
    fn private_and_description_both_accepted_by_parser() {
        // The conflict is reported by visibility selection, not clap.
        let cli = parse(&["-p", "-d", "x", "tool"]);
        assert!(cli.private && cli.description.is_some());
    }

    #[test]
    fn no_positionals() {
        let cli = parse(&["--list-sites"]);
        assert!(cli.list_sites);
        assert_eq!(cli.arg_count(), 0);
    }

    #[test]
    fn quiet_disables_interactive() {
        assert!(!parse(&["-q"]).interactive(true));
        assert!(!parse(&["--no-interactive"]).interactive(true));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
