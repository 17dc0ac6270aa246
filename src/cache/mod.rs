//! Package cache
//!
//! ## Cache Structure
//!
//! ```text
//! <base_dir>/
//! ├── pins.json
//! ├── .staging/            # private extraction directories
//! ├── .locks/              # per-package advisory locks
//! └── github/
//!     ├── .ghpin-package
//!     └── octo/
//!         ├── .ghpin-package
//!         └── demo/
//!             ├── .ghpin-package
//!             ├── .ghpin-index.json
//!             └── <repository contents or fetched modules>
//! ```
//!
//! Change detection compares content digests for single files and commit
//! SHAs for whole-archive directories. Replacement is always atomic: files
//! are written to a temporary sibling and renamed, directories are extracted
//! into a staging directory and renamed over the old copy.

pub mod archive;
pub mod index;
pub mod stats;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::Config;
use crate::error::{self, Result};
use crate::hash;
use crate::lock::FileLock;
use crate::package::{FetchMode, HostKind, Package};

pub use archive::extract_zipball;
pub use index::{CacheIndex, FileEntry, INDEX_FILE};
pub use stats::CacheStats;

/// Staging area for directory replacement, relative to the base directory
const STAGING_DIR: &str = ".staging";

/// Lock files, relative to the base directory
const LOCKS_DIR: &str = ".locks";

/// What a compare-and-swap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Content identical; nothing written
    NoAction,
    /// Nothing was cached before
    Installed,
    /// Cached content replaced
    Updated,
}

/// What [`Cache::clear`] removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub packages: usize,
    /// Bytes of fetched content removed
    pub bytes: u64,
    /// Whether a pin store document was deleted as well
    pub pins_removed: bool,
}

/// Change-detecting package cache rooted at a base directory
#[derive(Debug, Clone)]
pub struct Cache {
    base_dir: PathBuf,
    marker_name: String,
}

impl Cache {
    pub fn new(base_dir: impl Into<PathBuf>, marker_name: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            marker_name: marker_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_dir, &config.marker_name)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory mirroring `segments` below the base directory
    pub fn dir_for(&self, segments: &[String]) -> PathBuf {
        segments
            .iter()
            .fold(self.base_dir.clone(), |path, segment| path.join(segment))
    }

    /// Directory holding everything fetched for `package`'s repository
    pub fn package_dir(&self, package: &Package) -> PathBuf {
        self.dir_for(package.pin_key().segments())
    }

    /// Location of the artifact `mode` produces for `package`
    pub fn artifact_path(&self, package: &Package, mode: &FetchMode) -> PathBuf {
        let dir = self.package_dir(package);
        match mode {
            FetchMode::Archive => dir,
            FetchMode::File { relative_path } => relative_path
                .split('/')
                .fold(dir, |path, segment| path.join(segment)),
        }
    }

    pub fn artifact_exists(&self, package: &Package, mode: &FetchMode) -> bool {
        self.artifact_path(package, mode).exists()
    }

    /// Create the directory chain for `segments` with a marker in each directory
    pub fn ensure_scaffold(&self, segments: &[String]) -> Result<PathBuf> {
        let mut dir = self.base_dir.clone();
        for segment in segments {
            dir.push(segment);
            fs::create_dir_all(&dir).map_err(|e| error::fs::io_error(&dir, e))?;
            self.touch_marker(&dir)?;
        }
        Ok(dir)
    }

    /// Commit the extracted archive in `package_dir` came from
    pub fn archive_commit(&self, package_dir: &Path) -> Result<Option<String>> {
        Ok(CacheIndex::load(package_dir)?.archive.map(|a| a.commit))
    }

    /// Provenance of a single fetched file
    pub fn file_record(&self, package_dir: &Path, relative_path: &str) -> Result<Option<FileEntry>> {
        Ok(CacheIndex::load(package_dir)?.files.remove(relative_path))
    }

    /// Record that `relative_path` was fetched at `commit` with `digest`
    pub fn record_file(
        &self,
        package_dir: &Path,
        relative_path: &str,
        commit: &str,
        digest: &str,
    ) -> Result<()> {
        let mut index = CacheIndex::load(package_dir)?;
        index.files.insert(
            relative_path.to_string(),
            FileEntry {
                commit: commit.to_string(),
                digest: digest.to_string(),
            },
        );
        index.save(package_dir)
    }

    /// Hold the advisory lock serializing cache updates for `package`
    pub fn lock_package(&self, package: &Package) -> Result<FileLock> {
        let path = self
            .base_dir
            .join(LOCKS_DIR)
            .join(package.host.segment())
            .join(&package.owner)
            .join(format!("{}.lock", package.repo));
        FileLock::acquire(&path)
    }

    /// Write `new_content` to `cached_path` unless its digest is unchanged
    pub fn compare_and_swap_file(&self, cached_path: &Path, new_content: &[u8]) -> Result<SwapOutcome> {
        let new_digest = hash::hash_bytes(new_content);
        let outcome = match hash::hash_file(cached_path)? {
            Some(old_digest) if hash::verify_hash(&old_digest, &new_digest) => {
                return Ok(SwapOutcome::NoAction);
            }
            Some(_) => SwapOutcome::Updated,
            None => SwapOutcome::Installed,
        };

        write_atomic(cached_path, new_content)?;
        tracing::debug!(path = %cached_path.display(), ?outcome, "file swapped");
        Ok(outcome)
    }

    /// Replace the directory at `cached_path` unless it already holds `new_sha`.
    ///
    /// `extract` only runs once a change is certain. It populates a staging
    /// directory which then receives the marker and cache index and is
    /// renamed into place; the previous copy is moved aside first and removed
    /// last.
    ///
    /// Between the two renames `cached_path` does not exist. Readers may find
    /// it absent for that moment, never partially written.
    pub fn compare_and_swap_directory<F>(
        &self,
        cached_path: &Path,
        new_sha: &str,
        stored_sha: Option<&str>,
        extract: F,
    ) -> Result<SwapOutcome>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let existed = cached_path.is_dir();
        if existed && stored_sha == Some(new_sha) {
            return Ok(SwapOutcome::NoAction);
        }

        let staging_root = self.base_dir.join(STAGING_DIR);
        fs::create_dir_all(&staging_root).map_err(|e| error::fs::io_error(&staging_root, e))?;
        let staging = tempfile::Builder::new()
            .prefix("pkg-")
            .tempdir_in(&staging_root)
            .map_err(|e| error::fs::io_error(&staging_root, e))?;

        extract(staging.path())?;
        self.touch_marker(staging.path())?;
        CacheIndex::for_archive(new_sha).save(staging.path())?;

        if let Some(parent) = cached_path.parent() {
            fs::create_dir_all(parent).map_err(|e| error::fs::io_error(parent, e))?;
        }

        let aside = staging.path().with_extension("old");
        if existed {
            fs::rename(cached_path, &aside).map_err(|e| error::fs::io_error(cached_path, e))?;
        }
        if let Err(e) = fs::rename(staging.path(), cached_path) {
            if existed {
                if let Err(restore) = fs::rename(&aside, cached_path) {
                    tracing::warn!(
                        path = %cached_path.display(),
                        aside = %aside.display(),
                        error = %restore,
                        "failed to restore previous package"
                    );
                }
            }
            return Err(error::fs::io_error(cached_path, e));
        }
        if existed {
            if let Err(e) = fs::remove_dir_all(&aside) {
                tracing::warn!(path = %aside.display(), error = %e, "failed to remove replaced package");
            }
        }

        let outcome = if existed {
            SwapOutcome::Updated
        } else {
            SwapOutcome::Installed
        };
        tracing::debug!(path = %cached_path.display(), commit = new_sha, ?outcome, "directory swapped");
        Ok(outcome)
    }

    /// Statistics over every cached package
    pub fn stats(&self) -> Result<CacheStats> {
        stats::collect(&self.base_dir, &self.marker_name)
    }

    /// Remove every host tree and the staging area.
    ///
    /// The pin store, the configuration file and the lock files stay.
    pub fn clear(&self) -> Result<ClearSummary> {
        let stats = self.stats()?;
        let dirs = HostKind::ALL
            .iter()
            .map(|host| self.base_dir.join(host.segment()))
            .chain(std::iter::once(self.base_dir.join(STAGING_DIR)));
        for dir in dirs {
            if dir.exists() {
                fs::remove_dir_all(&dir).map_err(|e| error::fs::io_error(&dir, e))?;
                tracing::debug!(path = %dir.display(), "removed");
            }
        }
        Ok(ClearSummary {
            packages: stats.packages,
            bytes: stats.total_size,
            pins_removed: false,
        })
    }

    fn touch_marker(&self, dir: &Path) -> Result<()> {
        let marker = dir.join(&self.marker_name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&marker)
            .map_err(|e| error::fs::io_error(&marker, e))?;
        Ok(())
    }
}

/// Write `content` to a temporary sibling of `path`, then rename it over `path`
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| error::fs::io_error(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| error::fs::io_error(dir, e))?;
    tmp.write_all(content)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| error::fs::io_error(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| error::fs::io_error(path, e.error))?;
    Ok(())
}
