//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - fetch: Fetch command arguments
//! - pin: Pin command arguments
//! - unpin: Unpin command arguments
//! - show: Show command arguments
//! - cache: Cache command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub mod cache;
pub mod completions;
pub mod fetch;
pub mod pin;
pub mod show;
pub mod unpin;

pub use cache::{CacheArgs, CacheSubcommand, ClearCacheArgs};
pub use completions::CompletionsArgs;
pub use fetch::FetchArgs;
pub use pin::PinArgs;
pub use show::ShowArgs;
pub use unpin::UnpinArgs;

/// ghpin - pinned package fetcher for GitHub-hosted code
#[derive(Parser, Debug)]
#[command(
    name = "ghpin",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Resolve, pin and cache packages straight from GitHub repositories",
    long_about = "ghpin maps paths like github/owner/repo[/module] to a pinned commit, \
                  downloads the matching archive or file and keeps it in a local cache, \
                  refetching only when the pinned commit or the content changes.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  ghpin fetch github/octo/demo               \x1b[90m# Fetch the whole repository\x1b[0m\n   \
                  ghpin fetch github/octo/demo/util/strings  \x1b[90m# Fetch a single module\x1b[0m\n   \
                  ghpin pin github/octo/demo --tag v1.0      \x1b[90m# Fix the version to a tag\x1b[0m\n   \
                  ghpin unpin github/octo/demo               \x1b[90m# Return to the default branch\x1b[0m\n   \
                  ghpin fetch github/octo/demo@v2.0          \x1b[90m# Fetch a ref once, leaving the pin\x1b[0m\n   \
                  ghpin show                                 \x1b[90m# Show every pin\x1b[0m\n   \
                  ghpin cache clear                          \x1b[90m# Remove every cached package\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Cache directory (defaults to the platform cache directory)
    #[arg(long, global = true, env = "GHPIN_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a path and bring its cached copy up to date
    Fetch(FetchArgs),

    /// Pin a repository to a branch, tag or commit
    Pin(PinArgs),

    /// Remove a pin
    Unpin(UnpinArgs),

    /// Show pins as JSON
    Show(ShowArgs),

    /// Show cache statistics or clear the cache
    Cache(CacheArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_fetch() {
        let cli = Cli::try_parse_from(["ghpin", "fetch", "github/octo/demo"]).unwrap();
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.path, "github/octo/demo"),
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_cli_parsing_pin_tag() {
        let cli =
            Cli::try_parse_from(["ghpin", "pin", "github/octo/demo", "--tag", "v1.0"]).unwrap();
        match cli.command {
            Commands::Pin(args) => {
                assert_eq!(args.tag.as_deref(), Some("v1.0"));
                assert!(!args.force);
            }
            _ => panic!("Expected Pin command"),
        }
    }

    #[test]
    fn test_cli_pin_requires_exactly_one_ref() {
        assert!(Cli::try_parse_from(["ghpin", "pin", "github/octo/demo"]).is_err());
        assert!(
            Cli::try_parse_from([
                "ghpin",
                "pin",
                "github/octo/demo",
                "--tag",
                "v1",
                "--branch",
                "main"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_cli_parsing_show_no_path() {
        let cli = Cli::try_parse_from(["ghpin", "show"]).unwrap();
        match cli.command {
            Commands::Show(args) => assert_eq!(args.path, None),
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["ghpin", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_options() {
        let cli =
            Cli::try_parse_from(["ghpin", "-vv", "--cache-dir", "/tmp/ghpin-cache", "cache"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/ghpin-cache")));
        assert!(matches!(cli.command, Commands::Cache(CacheArgs { command: None })));
    }

    #[test]
    fn test_cli_parsing_cache_clear() {
        let cli = Cli::try_parse_from(["ghpin", "cache", "clear", "--pins"]).unwrap();
        match cli.command {
            Commands::Cache(CacheArgs {
                command: Some(CacheSubcommand::Clear(args)),
            }) => assert!(args.pins),
            _ => panic!("Expected cache clear command"),
        }
    }
}
