//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hibi blog metadata and search index CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: hibi.toml)
    #[arg(short = 'C', long, default_value = "hibi.toml")]
    pub config: PathBuf,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pages directory path (relative to project root)
    #[arg(short, long)]
    pub pages: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write the search index
    Build {
        /// Pretty-print the JSON output
        #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        pretty: Option<bool>,

        /// Fill missing dates from `YYYY-MM-DD-` file-name prefixes
        #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        date_from_slug: Option<bool>,
    },

    /// List posts, newest first, with their excerpts
    List {
        /// Show at most this many posts
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Show full ISO-8601 instants instead of `YYYY-MM-DD`
        #[arg(long)]
        iso: bool,
    },

    /// List categories with their class, hue, post count and route
    Categories,

    /// List months, newest first, with post counts and routes
    Months,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::parse_from(["hibi", "build", "--pretty", "false"]);
        assert!(matches!(
            cli.command,
            Commands::Build {
                pretty: Some(false),
                date_from_slug: None
            }
        ));

        let cli = Cli::parse_from(["hibi", "build", "--date-from-slug"]);
        assert!(matches!(
            cli.command,
            Commands::Build {
                pretty: None,
                date_from_slug: Some(true)
            }
        ));
    }

    #[test]
    fn test_parse_global_args() {
        let cli = Cli::parse_from(["hibi", "-r", "~/blog", "-C", "site.toml", "list", "-n", "5"]);
        assert_eq!(cli.root, Some(PathBuf::from("~/blog")));
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert!(matches!(
            cli.command,
            Commands::List {
                limit: Some(5),
                iso: false
            }
        ));

        let cli = Cli::parse_from(["hibi", "list", "--iso"]);
        assert!(matches!(cli.command, Commands::List { limit: None, iso: true }));
    }

    #[test]
    fn test_default_config_name() {
        let cli = Cli::parse_from(["hibi", "months"]);
        assert_eq!(cli.config, PathBuf::from("hibi.toml"));
        assert!(matches!(cli.command, Commands::Months));
    }

    #[test]
    fn test_requires_subcommand() {
        assert!(Cli::try_parse_from(["hibi"]).is_err());
    }
}
