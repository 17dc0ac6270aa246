//! Configuration errors

use super::GhpinError;

/// Creates a configuration parse error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> GhpinError {
    GhpinError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> GhpinError {
    GhpinError::ConfigInvalid {
        message: message.into(),
    }
}
