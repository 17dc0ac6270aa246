//! Advisory file locks shared between processes

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::FileExt;

use crate::error::{self, Result};

/// Exclusive advisory lock held until dropped
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until an exclusive lock on `path` is held, creating the file if needed
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| error::fs::io_error(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| error::store::lock_failed(format!("failed to open {}: {e}", path.display())))?;

        FileExt::lock_exclusive(&file).map_err(|e| {
            error::store::lock_failed(format!("failed to lock {}: {e}", path.display()))
        })?;

        tracing::trace!(path = %path.display(), "lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // The lock file stays so every waiter locks the same inode
        let _ = FileExt::unlock(&self.file);
    }
}

/// Lock file path guarding `target`, e.g. `pins.json` -> `pins.json.lock`
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    target.with_file_name(name)
}
