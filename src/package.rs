//! Package path parsing
//!
//! A package path names a node in the pin store and a mirrored directory in
//! the local cache: `github/<owner>/<repo>[@<ref>][/<module>/...]`.
//!
//! A `@<ref>` qualifier on the repository segment fetches that ref once. The
//! pin and the cache directory stay keyed by the bare repository name.

use std::fmt;

use crate::error::{self, Result};

/// Ordered, non-empty sequence of opaque path segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathKey(Vec<String>);

impl PathKey {
    /// Create a key from segments, rejecting empty keys and empty segments
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(error::path::invalid("", "path has no segments"));
        }
        if segments.iter().any(String::is_empty) {
            return Err(error::path::invalid(segments.join("/"), "empty segment"));
        }
        Ok(Self(segments))
    }

    /// Parse a slash separated key such as `github/octo/demo`
    pub fn parse(input: &str) -> Result<Self> {
        Self::new(split_segments(input)).map_err(|_| error::path::invalid(input, "empty segment"))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Supported content hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    GitHub,
}

impl HostKind {
    /// All supported hosts
    pub const ALL: &'static [HostKind] = &[HostKind::GitHub];

    /// Top-level segment identifying this host in paths and the pin store
    pub fn segment(self) -> &'static str {
        match self {
            HostKind::GitHub => "github",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|h| h.segment() == segment)
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// How a package's content is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// Whole repository, from the zipball of a commit
    Archive,
    /// Single file, from the raw content endpoint
    File { relative_path: String },
}

/// A path naming a complete owner and repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub host: HostKind,
    pub owner: String,
    pub repo: String,
    /// Segments below the repository naming a single module file
    pub module: Vec<String>,
    /// Ref named by a `repo@ref` qualifier
    pub git_ref: Option<String>,
}

impl Package {
    /// Key of the pin governing this package (one pin per repository)
    pub fn pin_key(&self) -> PathKey {
        PathKey(vec![
            self.host.segment().to_string(),
            self.owner.clone(),
            self.repo.clone(),
        ])
    }

    /// Fetch mode, appending `file_suffix` to the module path in file mode
    pub fn mode(&self, file_suffix: &str) -> FetchMode {
        if self.module.is_empty() {
            FetchMode::Archive
        } else {
            FetchMode::File {
                relative_path: format!("{}{}", self.module.join("/"), file_suffix),
            }
        }
    }
}

/// Parsed package path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagePath {
    /// Only a host or host/owner: directories are scaffolded, nothing is fetched
    Scaffold { segments: Vec<String> },
    /// A complete host/owner/repo path
    Package(Package),
}

impl PackagePath {
    /// Parse `github/owner/repo[@ref][/module...]`; leading and trailing slashes are ignored
    pub fn parse(input: &str) -> Result<Self> {
        let segments = split_segments(input);
        if segments.is_empty() {
            return Err(error::path::invalid(input, "path has no segments"));
        }
        for segment in &segments {
            validate_segment(input, segment)?;
        }

        let host = HostKind::from_segment(&segments[0])
            .ok_or_else(|| error::remote::unsupported_host(segments[0].clone()))?;

        if segments.len() < 3 {
            return Ok(PackagePath::Scaffold { segments });
        }

        let mut rest = segments.into_iter().skip(1);
        let owner = rest.next().unwrap_or_default();
        let (repo, git_ref) = split_qualifier(input, rest.next().unwrap_or_default())?;
        Ok(PackagePath::Package(Package {
            host,
            owner,
            repo,
            module: rest.collect(),
            git_ref,
        }))
    }

    /// Directory segments this path mirrors in the cache
    pub fn segments(&self) -> Vec<String> {
        match self {
            PackagePath::Scaffold { segments } => segments.clone(),
            PackagePath::Package(pkg) => pkg.pin_key().0,
        }
    }
}

fn split_segments(input: &str) -> Vec<String> {
    let trimmed = input.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(str::to_string).collect()
}

/// Split `repo@ref` into its parts
fn split_qualifier(input: &str, segment: String) -> Result<(String, Option<String>)> {
    let Some(at) = segment.find('@') else {
        return Ok((segment, None));
    };
    let (repo, git_ref) = (&segment[..at], &segment[at + 1..]);
    if repo.is_empty() || git_ref.is_empty() || git_ref.contains('@') {
        return Err(error::path::invalid(input, "expected repo@ref"));
    }
    Ok((repo.to_string(), Some(git_ref.to_string())))
}

fn validate_segment(input: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(error::path::invalid(input, "empty segment"));
    }
    if segment == "." || segment == ".." {
        return Err(error::path::invalid(input, "relative segments are not allowed"));
    }
    if segment.contains('\\') || segment.contains(':') {
        return Err(error::path::invalid(
            input,
            format!("segment '{segment}' contains a reserved character"),
        ));
    }
    Ok(())
}
