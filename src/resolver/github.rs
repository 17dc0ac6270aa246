//! GitHub REST resolver
//!
//! Endpoints used, relative to the configured API root:
//!
//! - `GET /repos/{owner}/{repo}` for the default branch
//! - `GET /repos/{owner}/{repo}/branches/{branch}`
//! - `GET /repos/{owner}/{repo}/tags?per_page=100&page={n}`
//! - `GET /repos/{owner}/{repo}/commits/{sha}`
//! - `GET /repos/{owner}/{repo}/zipball/{sha}`
//!
//! Single files come from the raw content host at `{raw}/{owner}/{repo}/{ref}/{path}`.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{HostResolver, HttpResponse, Resolution, Transport};
use crate::error::{self, Result};
use crate::reference::{RefKind, RefSpec};

/// Tags requested per page
pub const TAGS_PER_PAGE: usize = 100;

/// Upper bound on tag pages walked before giving up
const MAX_TAG_PAGES: usize = 50;

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BranchInfo {
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct TagInfo {
    name: String,
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GitHubResolver {
    api_url: String,
    raw_url: String,
    transport: Arc<dyn Transport>,
}

impl GitHubResolver {
    pub fn new(api_url: &str, raw_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            raw_url: raw_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}", self.api_url)
    }

    /// GET `url`, mapping any non-success status to `RemoteError`
    fn get_ok(&self, url: &str) -> Result<HttpResponse> {
        tracing::debug!(url, "GET");
        let response = self.transport.get(url)?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(error::remote::status_error(
                response.status,
                error_message(&response.body, url),
            ))
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get_ok(url)?;
        serde_json::from_slice(&response.body).map_err(|e| {
            error::remote::status_error(
                response.status,
                format!("unexpected response from {url}: {e}"),
            )
        })
    }

    fn resolve_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Resolution> {
        let url = format!("{}/branches/{branch}", self.repo_url(owner, repo));
        let info: BranchInfo = self.get_json(&url)?;
        Ok(Resolution {
            commit_sha: info.commit.sha,
            source_url: url,
        })
    }

    fn resolve_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Resolution> {
        let base = format!("{}/tags", self.repo_url(owner, repo));
        for page in 1..=MAX_TAG_PAGES {
            let url = format!("{base}?per_page={TAGS_PER_PAGE}&page={page}");
            let tags: Vec<TagInfo> = self.get_json(&url)?;
            let count = tags.len();
            if let Some(found) = tags.into_iter().find(|t| t.name == tag) {
                return Ok(Resolution {
                    commit_sha: found.commit.sha,
                    source_url: url,
                });
            }
            if count < TAGS_PER_PAGE {
                break;
            }
        }
        Err(error::remote::reference_not_found(
            owner,
            repo,
            RefKind::Tag.as_str(),
            tag,
        ))
    }

    fn verify_sha(&self, owner: &str, repo: &str, sha: &str) -> Result<Resolution> {
        let url = format!("{}/commits/{sha}", self.repo_url(owner, repo));
        self.get_ok(&url)?;
        Ok(Resolution {
            commit_sha: sha.to_string(),
            source_url: url,
        })
    }
}

impl HostResolver for GitHubResolver {
    fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let info: RepoInfo = self.get_json(&self.repo_url(owner, repo))?;
        Ok(info.default_branch)
    }

    fn resolve(&self, owner: &str, repo: &str, reference: &RefSpec) -> Result<Resolution> {
        let resolution = match reference {
            RefSpec::Branch(branch) => self.resolve_branch(owner, repo, branch)?,
            RefSpec::Tag(tag) => self.resolve_tag(owner, repo, tag)?,
            RefSpec::Sha(sha) => self.verify_sha(owner, repo, sha)?,
        };
        tracing::debug!(
            owner,
            repo,
            reference = %reference,
            commit = %resolution.commit_sha,
            "resolved"
        );
        Ok(resolution)
    }

    fn archive_url(&self, owner: &str, repo: &str, commit_sha: &str) -> String {
        format!("{}/zipball/{commit_sha}", self.repo_url(owner, repo))
    }

    fn raw_file_url(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        relative_path: &str,
    ) -> String {
        format!("{}/{owner}/{repo}/{git_ref}/{relative_path}", self.raw_url)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get_ok(url)?.body)
    }
}

/// The host's `message` field when the body is a JSON error, else the URL
fn error_message(body: &[u8], url: &str) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| url.to_string())
}
