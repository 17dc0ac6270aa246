//! Package path errors

use super::GhpinError;

/// Creates an invalid path error
pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> GhpinError {
    GhpinError::InvalidPath {
        path: path.into(),
        reason: reason.into(),
    }
}
