//! Test fixtures shared by unit and integration tests.
//!
//! [`ScriptedTransport`] answers requests from a URL table and records every
//! URL it was asked for, so tests can assert both on results and on which
//! remote lookups happened.
//!
//! ```ignore
//! let transport = Arc::new(ScriptedTransport::new());
//! transport.branch(API, "octo", "demo", "main", "abc123");
//! transport.zipball(API, "octo", "demo", "abc123", &[("README.md", b"hi")]);
//! ```

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Mutex;

use zip::write::FileOptions;

use crate::error::{self, Result};
use crate::resolver::{HttpResponse, Transport};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Debug, Default)]
struct ScriptState {
    routes: HashMap<String, Scripted>,
    requests: Vec<String>,
    offline: bool,
}

/// In-memory [`Transport`] driven by a URL table.
///
/// Unscripted URLs answer `404` with a GitHub-style JSON body.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    state: Mutex<ScriptState>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub fn respond(&self, url: &str, response: HttpResponse) {
        self.lock().routes.insert(url.to_string(), Scripted::Respond(response));
    }

    /// Answer `url` with `200` and a JSON body
    pub fn json(&self, url: &str, body: &str) {
        self.respond(url, HttpResponse::new(200, body.as_bytes()));
    }

    /// Fail `url` as if no response arrived
    pub fn fail(&self, url: &str, message: &str) {
        self.lock().routes.insert(url.to_string(), Scripted::Fail(message.to_string()));
    }

    /// Fail every request until switched back
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of requested URLs containing `fragment`
    pub fn count_matching(&self, fragment: &str) -> usize {
        self.lock().requests.iter().filter(|u| u.contains(fragment)).count()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    /// Script `GET {api}/repos/{owner}/{repo}`
    pub fn repo(&self, api: &str, owner: &str, repo: &str, default_branch: &str) {
        self.json(
            &format!("{api}/repos/{owner}/{repo}"),
            &serde_json::json!({ "full_name": format!("{owner}/{repo}"), "default_branch": default_branch })
                .to_string(),
        );
    }

    /// Script the head of `branch`
    pub fn branch(&self, api: &str, owner: &str, repo: &str, branch: &str, sha: &str) {
        self.json(
            &format!("{api}/repos/{owner}/{repo}/branches/{branch}"),
            &serde_json::json!({ "name": branch, "commit": { "sha": sha } }).to_string(),
        );
    }

    /// Script the first tag page with `(name, sha)` pairs
    pub fn tags(&self, api: &str, owner: &str, repo: &str, tags: &[(&str, &str)]) {
        let body: Vec<serde_json::Value> = tags
            .iter()
            .map(|(name, sha)| serde_json::json!({ "name": name, "commit": { "sha": sha } }))
            .collect();
        self.json(
            &format!("{api}/repos/{owner}/{repo}/tags?per_page=100&page=1"),
            &serde_json::Value::Array(body).to_string(),
        );
    }

    /// Script the existence check of a commit
    pub fn commit(&self, api: &str, owner: &str, repo: &str, sha: &str) {
        self.json(
            &format!("{api}/repos/{owner}/{repo}/commits/{sha}"),
            &serde_json::json!({ "sha": sha }).to_string(),
        );
    }

    /// Script the zipball at `sha` with `files` under the usual top-level directory
    pub fn zipball(&self, api: &str, owner: &str, repo: &str, sha: &str, files: &[(&str, &[u8])]) {
        let prefix = format!("{owner}-{repo}-{}", &sha[..sha.len().min(7)]);
        self.respond(
            &format!("{api}/repos/{owner}/{repo}/zipball/{sha}"),
            HttpResponse::new(200, zipball(&prefix, files)),
        );
    }

    /// Script a raw file at `git_ref`
    pub fn raw(&self, raw: &str, owner: &str, repo: &str, git_ref: &str, path: &str, body: &[u8]) {
        self.respond(
            &format!("{raw}/{owner}/{repo}/{git_ref}/{path}"),
            HttpResponse::new(200, body),
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().expect("scripted transport mutex poisoned")
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let mut state = self.lock();
        state.requests.push(url.to_string());
        if state.offline {
            return Err(error::remote::transport_error(format!("{url}: network unreachable")));
        }
        match state.routes.get(url) {
            Some(Scripted::Respond(response)) => Ok(response.clone()),
            Some(Scripted::Fail(message)) => Err(error::remote::transport_error(message.clone())),
            None => Ok(HttpResponse::new(404, r#"{"message":"Not Found"}"#)),
        }
    }
}

/// Build a zip archive with every file nested under `prefix/`.
///
/// # Panics
///
/// Panics if the in-memory archive cannot be written.
#[must_use]
pub fn zipball(prefix: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    writer
        .add_directory(format!("{prefix}/"), options)
        .expect("Failed to add zip directory");
    for (path, content) in files {
        writer
            .start_file(format!("{prefix}/{path}"), options)
            .expect("Failed to start zip entry");
        writer.write_all(content).expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip archive").into_inner()
}
