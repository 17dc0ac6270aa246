//! Pin store errors

use super::GhpinError;

/// Creates a not-a-pin error
pub fn not_a_pin(path: impl Into<String>) -> GhpinError {
    GhpinError::NotAPin { path: path.into() }
}

/// Creates a no-such-path error
pub fn no_such_path(path: impl Into<String>) -> GhpinError {
    GhpinError::NoSuchPath { path: path.into() }
}

/// Creates an error for a leaf found where a node was expected
pub fn not_an_internal_node(path: impl Into<String>) -> GhpinError {
    GhpinError::NotAnInternalNode { path: path.into() }
}

/// Creates a corrupt store error
pub fn corrupt(path: impl Into<String>, reason: impl Into<String>) -> GhpinError {
    GhpinError::StoreCorrupt {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a lock failure error
pub fn lock_failed(reason: impl Into<String>) -> GhpinError {
    GhpinError::StoreLockFailed {
        reason: reason.into(),
    }
}

/// Creates a pin conflict error
pub fn pin_conflict(
    path: impl Into<String>,
    existing: impl Into<String>,
    requested: impl Into<String>,
) -> GhpinError {
    GhpinError::PinConflict {
        path: path.into(),
        existing: existing.into(),
        requested: requested.into(),
    }
}
