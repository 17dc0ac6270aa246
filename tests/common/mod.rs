//! Common test utilities for ghpin integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::Command;
use ghpin::config::Config;
use ghpin::fetch::Orchestrator;
use ghpin::resolver::Transport;
use ghpin::test_fixtures::ScriptedTransport;
use tempfile::TempDir;

pub const API: &str = "https://api.test";
pub const RAW: &str = "https://raw.test";

/// An orchestrator over a scripted host, rooted in a temporary cache
pub struct Harness {
    pub temp: TempDir,
    pub transport: Arc<ScriptedTransport>,
    pub orchestrator: Orchestrator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let mut config = Config::with_base_dir(temp.path());
        config.api_url = API.to_string();
        config.raw_url = RAW.to_string();
        tweak(&mut config);

        let transport = Arc::new(ScriptedTransport::new());
        let orchestrator = Orchestrator::new(config, Arc::clone(&transport) as Arc<dyn Transport>);
        Self {
            temp,
            transport,
            orchestrator,
        }
    }

    pub fn base(&self) -> &Path {
        self.temp.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    /// Raw bytes of the pin store document, or empty if it was never written
    pub fn store_bytes(&self) -> Vec<u8> {
        std::fs::read(self.path("pins.json")).unwrap_or_default()
    }

    /// Relative path and content of every file below `relative`, sorted
    pub fn snapshot(&self, relative: &str) -> Vec<(String, Vec<u8>)> {
        let root = self.path(relative);
        if !root.exists() {
            return Vec::new();
        }
        let mut files: Vec<(String, Vec<u8>)> = walkdir::WalkDir::new(&root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e
                    .path()
                    .strip_prefix(&root)
                    .expect("entry below root")
                    .to_string_lossy()
                    .replace('\\', "/");
                let content = std::fs::read(e.path()).expect("Failed to read file");
                (rel, content)
            })
            .collect();
        files.sort();
        files
    }
}

/// The real ghpin binary, isolated from the user's environment
#[allow(deprecated)]
pub fn ghpin_cmd(cache_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ghpin").expect("ghpin binary is built");
    cmd.env("GHPIN_CACHE_DIR", cache_dir)
        .env_remove("GHPIN_API_URL")
        .env_remove("GHPIN_RAW_URL")
        .env_remove("GHPIN_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}
