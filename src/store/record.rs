//! Pin records and their document shape
//!
//! ```json
//! { "id": "pin", "commit": { "sha": "abc123", "url": "https://..." }, "branch": "main" }
//! ```
//!
//! Branch pins carry `branch`, tag pins carry `tag`, SHA pins carry neither.

use serde::{Deserialize, Serialize};

use crate::reference::RefSpec;

/// Value of the `id` field identifying a pin leaf
pub const PIN_ID: &str = "pin";

/// Persisted version policy and last resolved commit for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRecord {
    pub reference: RefSpec,
    /// Commit the reference resolved to; never empty
    pub commit_sha: String,
    /// URL the resolution was sourced from
    pub source_url: String,
}

impl PinRecord {
    pub fn new(
        reference: RefSpec,
        commit_sha: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            reference,
            commit_sha: commit_sha.into(),
            source_url: source_url.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCommit {
    sha: String,
    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawPin {
    id: String,
    commit: RawCommit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
}

impl Serialize for PinRecord {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (branch, tag) = match &self.reference {
            RefSpec::Branch(b) => (Some(b.clone()), None),
            RefSpec::Tag(t) => (None, Some(t.clone())),
            RefSpec::Sha(_) => (None, None),
        };
        RawPin {
            id: PIN_ID.to_string(),
            commit: RawCommit {
                sha: self.commit_sha.clone(),
                url: self.source_url.clone(),
            },
            branch,
            tag,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PinRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = RawPin::deserialize(deserializer)?;
        if raw.id != PIN_ID {
            return Err(D::Error::custom(format!("expected id 'pin', got '{}'", raw.id)));
        }
        if raw.commit.sha.is_empty() {
            return Err(D::Error::custom("pin has an empty commit sha"));
        }
        let reference = match (raw.branch, raw.tag) {
            (Some(b), None) => RefSpec::Branch(b),
            (None, Some(t)) => RefSpec::Tag(t),
            (None, None) => RefSpec::Sha(raw.commit.sha.clone()),
            (Some(_), Some(_)) => {
                return Err(D::Error::custom("pin has both 'branch' and 'tag'"));
            }
        };
        Ok(Self {
            reference,
            commit_sha: raw.commit.sha,
            source_url: raw.commit.url,
        })
    }
}
