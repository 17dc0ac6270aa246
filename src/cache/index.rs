//! Per-package cache index
//!
//! Each package directory carries `.ghpin-index.json`, recording which commit
//! the extracted archive came from and, for single files, the commit and
//! digest each file was fetched at.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

/// File name of the index inside a package directory
pub const INDEX_FILE: &str = ".ghpin-index.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub commit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub commit: String,
    pub digest: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, FileEntry>,
}

impl CacheIndex {
    /// Index for a freshly extracted archive
    pub fn for_archive(commit: &str) -> Self {
        Self {
            archive: Some(ArchiveEntry {
                commit: commit.to_string(),
            }),
            files: BTreeMap::new(),
        }
    }

    /// Read the index of `package_dir`.
    ///
    /// A missing or unreadable index reads as empty, which only ever causes a
    /// refetch.
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(INDEX_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(error::fs::io_error(&path, e)),
        };

        match serde_json::from_str(&content) {
            Ok(index) => Ok(index),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable cache index");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, package_dir: &Path) -> Result<()> {
        let path = package_dir.join(INDEX_FILE);
        let content = serde_json::to_vec_pretty(self).map_err(|e| error::fs::io_error(&path, e))?;
        super::write_atomic(&path, &content)
    }

    pub fn archive_commit(&self) -> Option<&str> {
        self.archive.as_ref().map(|a| a.commit.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_index_is_empty() {
        let temp = TempDir::new().unwrap();
        assert_eq!(CacheIndex::load(temp.path()).unwrap(), CacheIndex::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let mut index = CacheIndex::for_archive("abc123");
        index.files.insert(
            "util/strings.py".to_string(),
            FileEntry {
                commit: "abc123".to_string(),
                digest: "blake3:00".to_string(),
            },
        );
        index.save(temp.path()).unwrap();

        let loaded = CacheIndex::load(temp.path()).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.archive_commit(), Some("abc123"));
    }

    #[test]
    fn test_garbage_index_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(INDEX_FILE), "not json").unwrap();
        assert_eq!(CacheIndex::load(temp.path()).unwrap(), CacheIndex::default());
    }
}
