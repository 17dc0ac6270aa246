//! Configuration for ghpin
//!
//! A [`Config`] is built once and handed to the pin store, the cache and the
//! orchestrator. Values are layered, later layers winning:
//!
//! 1. built-in defaults (`~/.cache/ghpin` on Linux)
//! 2. `<base_dir>/config.yaml`, if present
//! 3. environment variables (`GHPIN_*`)
//! 4. explicit overrides from the caller (CLI flags)

mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{self, GhpinError, Result};

pub use file::ConfigFile;

/// Directory name under the user's cache directory
const CACHE_DIR: &str = "ghpin";

/// Pin store document, relative to the base directory
pub const STORE_FILE: &str = "pins.json";

/// Optional configuration file, relative to the base directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Empty file marking a directory as a resolved package
pub const DEFAULT_MARKER_NAME: &str = ".ghpin-package";

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_CACHE_DIR: &str = "GHPIN_CACHE_DIR";
pub const ENV_API_URL: &str = "GHPIN_API_URL";
pub const ENV_RAW_URL: &str = "GHPIN_RAW_URL";
pub const ENV_TIMEOUT_SECS: &str = "GHPIN_TIMEOUT_SECS";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the package cache
    pub base_dir: PathBuf,
    /// Pin store document
    pub store_path: PathBuf,
    /// REST API endpoint of the content host
    pub api_url: String,
    /// Raw file content endpoint of the content host
    pub raw_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Marker file created in every package directory
    pub marker_name: String,
    /// Suffix appended to module paths in single-file mode (e.g. `.py`)
    pub file_suffix: String,
}

impl Config {
    /// Defaults rooted at `base_dir`, ignoring files and environment
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            store_path: base_dir.join(STORE_FILE),
            base_dir,
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            marker_name: DEFAULT_MARKER_NAME.to_string(),
            file_suffix: String::new(),
        }
    }

    /// Load the layered configuration from the process environment
    pub fn load(base_override: Option<PathBuf>) -> Result<Self> {
        Self::load_with(base_override, |key| std::env::var(key).ok())
    }

    /// Load the layered configuration using `lookup` for environment variables
    pub fn load_with<F>(base_override: Option<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_dir = match base_override {
            Some(dir) => dir,
            None => match lookup(ENV_CACHE_DIR) {
                Some(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => default_base_dir()?,
            },
        };

        let mut config = Self::with_base_dir(base_dir);
        if let Some(file) = ConfigFile::load(&config.base_dir.join(CONFIG_FILE))? {
            config.apply_file(file);
        }
        config.apply_env(lookup)?;
        config.validate()?;
        tracing::debug!(base_dir = %config.base_dir.display(), "configuration loaded");
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(store_path) = file.store_path {
            self.store_path = resolve_against(&self.base_dir, store_path);
        }
        if let Some(api_url) = file.api_url {
            self.api_url = api_url;
        }
        if let Some(raw_url) = file.raw_url {
            self.raw_url = raw_url;
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(marker_name) = file.marker_name {
            self.marker_name = marker_name;
        }
        if let Some(file_suffix) = file.file_suffix {
            self.file_suffix = file_suffix;
        }
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_url) = lookup(ENV_API_URL) {
            self.api_url = api_url;
        }
        if let Some(raw_url) = lookup(ENV_RAW_URL) {
            self.raw_url = raw_url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                error::config::invalid(format!("{ENV_TIMEOUT_SECS} must be a number of seconds, got '{secs}'"))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    /// Check values that would otherwise fail late
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(error::config::invalid("timeout must be greater than zero"));
        }
        for (name, url) in [("api_url", &self.api_url), ("raw_url", &self.raw_url)] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(error::config::invalid(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.marker_name.is_empty() || self.marker_name.contains(['/', '\\']) {
            return Err(error::config::invalid(format!(
                "marker_name must be a plain file name, got '{}'",
                self.marker_name
            )));
        }
        Ok(())
    }
}

/// Platform cache directory with a `ghpin` subdirectory
fn default_base_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().ok_or_else(|| GhpinError::ConfigInvalid {
        message: "Could not determine cache directory".to_string(),
    })?;
    Ok(base.join(CACHE_DIR))
}

fn resolve_against(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
