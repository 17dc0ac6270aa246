//! Error types and handling for ghpin
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Constructors are grouped into sub-modules by error domain:
//! - [`remote`]: content host errors
//! - [`store`]: pin store errors
//! - [`fs`]: local file system errors
//! - [`config`]: configuration errors
//! - [`path`]: package path errors

pub mod config;
pub mod fs;
pub mod path;
pub mod remote;
pub mod store;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for ghpin operations
#[derive(Error, Diagnostic, Debug)]
pub enum GhpinError {
    // Remote errors
    #[error("No {kind} named '{name}' in {owner}/{repo}")]
    #[diagnostic(
        code(ghpin::remote::reference_not_found),
        help("Check the spelling of the ref, or pin a branch or commit SHA instead")
    )]
    ReferenceNotFound {
        owner: String,
        repo: String,
        kind: String,
        name: String,
    },

    #[error("Remote request failed{}: {message}", status_suffix(.status))]
    #[diagnostic(code(ghpin::remote::request_failed))]
    RemoteError { status: Option<u16>, message: String },

    #[error("Unsupported host: {host}")]
    #[diagnostic(
        code(ghpin::remote::unsupported_host),
        help("Supported hosts: github")
    )]
    UnsupportedHost { host: String },

    // Store errors
    #[error("Not a pin: {path}")]
    #[diagnostic(
        code(ghpin::store::not_a_pin),
        help("Only pin entries can be removed; intermediate nodes are kept")
    )]
    NotAPin { path: String },

    #[error("No such path in pin store: {path}")]
    #[diagnostic(code(ghpin::store::no_such_path))]
    NoSuchPath { path: String },

    #[error("Cannot descend into '{path}': it is a leaf, not a node")]
    #[diagnostic(code(ghpin::store::not_an_internal_node))]
    NotAnInternalNode { path: String },

    #[error("Pin store is corrupt: {path}: {reason}")]
    #[diagnostic(
        code(ghpin::store::corrupt),
        help("Fix or remove the pin store document; it is never overwritten while unreadable")
    )]
    StoreCorrupt { path: String, reason: String },

    #[error("Failed to lock pin store: {reason}")]
    #[diagnostic(code(ghpin::store::lock_failed))]
    StoreLockFailed { reason: String },

    #[error("'{path}' is already pinned to {existing}; refusing to replace it with {requested}")]
    #[diagnostic(
        code(ghpin::store::pin_conflict),
        help("Pass --force to replace a pin of a different kind")
    )]
    PinConflict {
        path: String,
        existing: String,
        requested: String,
    },

    // Path errors
    #[error("Invalid package path '{path}': {reason}")]
    #[diagnostic(
        code(ghpin::path::invalid),
        help("Paths look like github/owner/repo or github/owner/repo/module")
    )]
    InvalidPath { path: String, reason: String },

    // Local file system errors
    #[error("Local IO error at {path}: {reason}")]
    #[diagnostic(code(ghpin::fs::io_error))]
    LocalIo { path: String, reason: String },

    #[error("Failed to serialize JSON: {reason}")]
    #[diagnostic(code(ghpin::fs::serialize_failed))]
    SerializeFailed { reason: String },

    #[error("Failed to unpack archive: {reason}")]
    #[diagnostic(code(ghpin::fs::archive_failed))]
    ArchiveFailed { reason: String },

    // Configuration errors
    #[error("Failed to parse configuration: {path}: {reason}")]
    #[diagnostic(code(ghpin::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(ghpin::config::invalid))]
    ConfigInvalid { message: String },
}

impl GhpinError {
    /// Whether the failure came from the content host or its payload
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            GhpinError::ReferenceNotFound { .. }
                | GhpinError::RemoteError { .. }
                | GhpinError::ArchiveFailed { .. }
        )
    }
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

impl From<std::io::Error> for GhpinError {
    fn from(err: std::io::Error) -> Self {
        GhpinError::LocalIo {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GhpinError {
    fn from(err: serde_json::Error) -> Self {
        GhpinError::SerializeFailed {
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for GhpinError {
    fn from(err: serde_yaml::Error) -> Self {
        GhpinError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for GhpinError {
    fn from(err: zip::result::ZipError) -> Self {
        GhpinError::ArchiveFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, GhpinError>;
