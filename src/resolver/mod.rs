//! Reference resolution against content hosts
//!
//! This module handles:
//! - Resolving branches, tags and commit SHAs to exact commit SHAs
//! - Building archive and raw file download URLs
//! - Downloading content through a [`Transport`]
//!
//! Hosts form a closed set ([`HostKind`]); [`Resolver::for_host`] dispatches
//! to the matching [`HostResolver`] implementation.

pub mod github;
pub mod http;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::package::HostKind;
use crate::reference::RefSpec;

pub use github::GitHubResolver;
pub use http::HttpTransport;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET.
///
/// Implementations return `Ok` for any response the host produced, including
/// error statuses, and `Err(RemoteError { status: None, .. })` only when no
/// response was received (connection failure, timeout).
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Outcome of resolving a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub commit_sha: String,
    /// URL the commit was read from
    pub source_url: String,
}

/// Operations every content host supports
pub trait HostResolver: Send + Sync {
    /// Name of the repository's primary branch
    fn default_branch(&self, owner: &str, repo: &str) -> Result<String>;

    /// Resolve `reference` to a concrete commit
    fn resolve(&self, owner: &str, repo: &str, reference: &RefSpec) -> Result<Resolution>;

    /// Download URL of the repository archive at `commit_sha`
    fn archive_url(&self, owner: &str, repo: &str, commit_sha: &str) -> String;

    /// Download URL of one file at `git_ref` (a branch name or commit SHA)
    fn raw_file_url(&self, owner: &str, repo: &str, git_ref: &str, relative_path: &str)
    -> String;

    /// Fetch the body of `url`, failing on any non-success status
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Dispatches resolution to the resolver of each supported host
pub struct Resolver {
    github: GitHubResolver,
}

impl Resolver {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            github: GitHubResolver::new(&config.api_url, &config.raw_url, transport),
        }
    }

    pub fn for_host(&self, host: HostKind) -> &dyn HostResolver {
        match host {
            HostKind::GitHub => &self.github,
        }
    }
}
