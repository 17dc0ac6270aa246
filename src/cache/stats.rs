//! Cache statistics

use std::path::Path;

use walkdir::WalkDir;

use super::index::INDEX_FILE;
use crate::error::{self, Result};
use crate::package::HostKind;

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Directories holding a fetched package
    pub packages: usize,
    /// Fetched files, excluding markers and indexes
    pub files: usize,
    /// Total size of fetched files in bytes
    pub total_size: u64,
}

impl CacheStats {
    /// Format total size as human-readable string
    pub fn formatted_size(&self) -> String {
        let size = self.total_size as f64;
        if size < 1024.0 {
            format!("{} B", self.total_size)
        } else if size < 1024.0 * 1024.0 {
            format!("{:.1} KB", size / 1024.0)
        } else if size < 1024.0 * 1024.0 * 1024.0 {
            format!("{:.1} MB", size / (1024.0 * 1024.0))
        } else {
            format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
        }
    }
}

/// Walk every host tree below `base_dir`
pub(super) fn collect(base_dir: &Path, marker_name: &str) -> Result<CacheStats> {
    let mut stats = CacheStats::default();

    for host in HostKind::ALL {
        let root = base_dir.join(host.segment());
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root) {
            let entry = entry.map_err(|e| error::fs::io_error(&root, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name == INDEX_FILE {
                stats.packages += 1;
                continue;
            }
            if name == marker_name {
                continue;
            }
            stats.files += 1;
            stats.total_size += entry
                .metadata()
                .map_err(|e| error::fs::io_error(entry.path(), e))?
                .len();
        }
    }

    Ok(stats)
}
