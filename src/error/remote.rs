//! Content host errors

use super::GhpinError;

/// Creates a reference-not-found error for a named ref of the given kind
pub fn reference_not_found(
    owner: impl Into<String>,
    repo: impl Into<String>,
    kind: impl Into<String>,
    name: impl Into<String>,
) -> GhpinError {
    GhpinError::ReferenceNotFound {
        owner: owner.into(),
        repo: repo.into(),
        kind: kind.into(),
        name: name.into(),
    }
}

/// Creates an error for a non-success response from the host
pub fn status_error(status: u16, message: impl Into<String>) -> GhpinError {
    GhpinError::RemoteError {
        status: Some(status),
        message: message.into(),
    }
}

/// Creates an error for a request that never produced a response
pub fn transport_error(message: impl Into<String>) -> GhpinError {
    GhpinError::RemoteError {
        status: None,
        message: message.into(),
    }
}

/// Creates an unsupported host error
pub fn unsupported_host(host: impl Into<String>) -> GhpinError {
    GhpinError::UnsupportedHost { host: host.into() }
}
