//! ghpin - pinned package fetcher for GitHub-hosted code
//!
//! Resolves paths like `github/owner/repo[@ref][/module...]` to a commit, keeps a
//! persistent pin per repository and caches the fetched archive or file,
//! refetching only when the commit or the content changed.
//!
//! The entry point is [`fetch::Orchestrator`]:
//!
//! ```no_run
//! use ghpin::config::Config;
//! use ghpin::fetch::Orchestrator;
//!
//! # fn main() -> ghpin::error::Result<()> {
//! let orchestrator = Orchestrator::connect(Config::load(None)?)?;
//! let report = orchestrator.resolve_and_fetch("github/octo/demo")?;
//! println!("{} -> {}", report.outcome, report.artifact.display());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod hash;
pub mod lock;
pub mod package;
pub mod reference;
pub mod resolver;
pub mod store;
#[cfg(any(test, feature = "test-util"))]
pub mod test_fixtures;
