//! `config.yaml` schema

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{self, Result};

/// Optional overrides read from `<base_dir>/config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Pin store document; relative paths are resolved against the base directory
    pub store_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub raw_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub marker_name: Option<String>,
    pub file_suffix: Option<String>,
}

impl ConfigFile {
    /// Read and parse the file, returning `None` when it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(error::fs::io_error(path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Some(Self::default()));
        }

        serde_yaml::from_str(&content)
            .map(Some)
            .map_err(|e| error::config::parse_failed(path.display().to_string(), e.to_string()))
    }
}
