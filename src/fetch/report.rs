//! Fetch outcomes

use std::fmt;
use std::path::PathBuf;

use crate::cache::SwapOutcome;
use crate::package::PathKey;

/// What a call to `resolve_and_fetch` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Host or owner path: directories and markers only
    Scaffolded,
    /// Existing version used; nothing downloaded, nothing written
    Skipped,
    /// The host could not be reached; the existing artifact was kept
    Degraded { reason: String },
    /// Fetched and placed where nothing was cached before
    Installed,
    /// Fetched and replaced different cached content
    Updated,
    /// Fetched, but identical to what was cached
    Unchanged,
}

impl Outcome {
    pub(crate) fn from_swap(swap: SwapOutcome) -> Self {
        match swap {
            SwapOutcome::NoAction => Outcome::Unchanged,
            SwapOutcome::Installed => Outcome::Installed,
            SwapOutcome::Updated => Outcome::Updated,
        }
    }

    /// Whether the call downloaded content
    pub fn fetched(&self) -> bool {
        matches!(self, Outcome::Installed | Outcome::Updated | Outcome::Unchanged)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Scaffolded => f.write_str("scaffolded"),
            Outcome::Skipped => f.write_str("existing version used"),
            Outcome::Degraded { reason } => write!(f, "offline, existing version used ({reason})"),
            Outcome::Installed => f.write_str("installed"),
            Outcome::Updated => f.write_str("updated"),
            Outcome::Unchanged => f.write_str("unchanged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub outcome: Outcome,
    /// Pin governing the path; the scaffolded segments for host/owner paths
    pub pin_key: PathKey,
    /// Fetched file or package directory
    pub artifact: PathBuf,
    /// Commit the artifact corresponds to, when known
    pub commit_sha: Option<String>,
}
