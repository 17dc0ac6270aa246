//! Pin store
//!
//! One JSON document maps path segments to pin records:
//!
//! ```text
//! { "github": { "octo": { "demo": { "id": "pin", "commit": {...}, "branch": "main" } } } }
//! ```
//!
//! The whole document is loaded, mutated in memory and rewritten on every
//! mutation. Each read-modify-write cycle runs under an in-process mutex and
//! an advisory file lock so that concurrent writers cannot clobber one
//! another's subtrees. Writes go to a temporary file that is renamed over the
//! document.

pub mod record;
pub mod tree;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::{self, Result};
use crate::lock::{FileLock, lock_path_for};
use crate::package::PathKey;

pub use record::PinRecord;
pub use tree::Node;

/// Persistent pin tree backed by a single JSON document
#[derive(Debug)]
pub struct PinStore {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl PinStore {
    /// Open the store at `path`; a missing document reads as an empty tree
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pin at `key`, or `None` if any segment is missing or the node is not a pin
    pub fn get(&self, key: &PathKey) -> Result<Option<PinRecord>> {
        Ok(self.load()?.pin(key.segments()).cloned())
    }

    /// Store `record` at `key`, creating intermediate nodes as needed
    pub fn set(&self, key: &PathKey, record: PinRecord) -> Result<()> {
        self.update(|tree| tree.insert_pin(key.segments(), record))?;
        tracing::debug!(path = %key, "pin stored");
        Ok(())
    }

    /// Remove the pin at `key`
    pub fn delete(&self, key: &PathKey) -> Result<PinRecord> {
        let removed = self.update(|tree| tree.remove_pin(key.segments()))?;
        tracing::debug!(path = %key, "pin removed");
        Ok(removed)
    }

    /// Read-only copy of the node at `prefix`; an empty prefix yields the root
    pub fn subtree(&self, prefix: &[String]) -> Result<Option<Node>> {
        Ok(self.load()?.lookup(prefix).cloned())
    }

    /// Delete the whole document; returns whether one existed
    pub fn remove(&self) -> Result<bool> {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| error::store::lock_failed("pin store mutex poisoned"))?;
        let _file_lock = FileLock::acquire(&lock_path_for(&self.path))?;

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(error::fs::io_error(&self.path, e)),
        }
    }

    /// Run `mutate` against the current tree and persist it if `mutate` succeeds.
    ///
    /// The lock spans the full read, mutate and write sequence.
    pub fn update<F, R>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Node) -> Result<R>,
    {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| error::store::lock_failed("pin store mutex poisoned"))?;
        let _file_lock = FileLock::acquire(&lock_path_for(&self.path))?;

        let mut tree = self.load()?;
        let result = mutate(&mut tree)?;
        self.persist(&tree)?;
        Ok(result)
    }

    fn load(&self) -> Result<Node> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Node::default()),
            Err(e) => return Err(error::fs::io_error(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Node::default());
        }

        let tree: Node = serde_json::from_str(&content)
            .map_err(|e| error::store::corrupt(self.path.display().to_string(), e.to_string()))?;
        if !matches!(tree, Node::Internal(_)) {
            return Err(error::store::corrupt(
                self.path.display().to_string(),
                "document root must be an object",
            ));
        }
        Ok(tree)
    }

    fn persist(&self, tree: &Node) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| error::fs::io_error(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| error::fs::io_error(dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, tree)
            .map_err(|e| error::fs::io_error(tmp.path(), e))?;
        tmp.write_all(b"\n")
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| error::fs::io_error(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| error::fs::io_error(&self.path, e.error))?;
        Ok(())
    }
}
