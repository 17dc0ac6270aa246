//! File system errors

use std::path::Path;

use super::GhpinError;

/// Creates a local IO error for an operation on `path`
pub fn io_error(path: &Path, err: impl ToString) -> GhpinError {
    GhpinError::LocalIo {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates an archive extraction error
pub fn archive_failed(reason: impl Into<String>) -> GhpinError {
    GhpinError::ArchiveFailed {
        reason: reason.into(),
    }
}
