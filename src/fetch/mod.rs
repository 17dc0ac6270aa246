//! Fetch orchestration
//!
//! [`Orchestrator::resolve_and_fetch`] decides, per call, between skipping,
//! reusing and fetching-and-replacing:
//!
//! ```text
//! Start ─┬─> ScaffoldOnly                               (host or owner path)
//!        └─> Resolving ─┬─> Skip                        (artifact current)
//!                       └─> Fetching ─> Persisting ─> Done
//!            Resolving / Fetching ─> Failed ─> Skip     (degraded, artifact present)
//! ```
//!
//! Branch pins re-resolve on every call; tag and SHA pins never touch the
//! network once their artifact is in place. The pin store is written only
//! after the new content is in the cache.
//!
//! Every read-modify-write of a repository's pin runs under that
//! repository's package lock, so an explicit [`Orchestrator::pin`] cannot be
//! overwritten by a fetch that read the pin before it.
//!
//! A `repo@ref` qualifier resolves the ref for this call only: the content
//! at that commit is placed in the cache and the pin store is left alone.

pub mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{self, Cache};
use crate::config::Config;
use crate::error::{self, GhpinError, Result};
use crate::hash;
use crate::package::{FetchMode, Package, PackagePath, PathKey};
use crate::reference::RefSpec;
use crate::resolver::{HostResolver, HttpTransport, Resolution, Resolver, Transport};
use crate::store::{Node, PinRecord, PinStore};

pub use report::{FetchReport, Outcome};

#[derive(Debug, Clone, Copy)]
enum State {
    Start,
    ScaffoldOnly,
    Resolving,
    Skip,
    Fetching,
    Persisting,
    Done,
    Failed,
}

/// Commit to materialize and the pin record to write once it is in place
struct Target {
    commit_sha: String,
    new_record: Option<PinRecord>,
}

pub struct Orchestrator {
    config: Config,
    store: PinStore,
    cache: Cache,
    resolver: Resolver,
}

impl Orchestrator {
    /// Orchestrator talking to the host through `transport`
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            store: PinStore::open(&config.store_path),
            cache: Cache::from_config(&config),
            resolver: Resolver::new(&config, transport),
            config,
        }
    }

    /// Orchestrator using the HTTP transport
    pub fn connect(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn store(&self) -> &PinStore {
        &self.store
    }

    /// Pin the repository of `path` to `reference`, resolving it first.
    ///
    /// Pinning the ref already in place returns the stored record without
    /// any request. Replacing a pin of another kind requires `overwrite`.
    pub fn pin(&self, path: &str, reference: RefSpec, overwrite: bool) -> Result<PinRecord> {
        let package = package_path(path)?;
        if package.git_ref.is_some() {
            return Err(error::path::invalid(
                path,
                "a pinned ref is given with --branch, --tag or --sha",
            ));
        }
        let key = package.pin_key();
        let _lock = self.cache.lock_package(&package)?;

        if let Some(existing) = self.store.get(&key)? {
            if existing.reference == reference {
                tracing::debug!(path = %key, reference = %reference, "already pinned");
                return Ok(existing);
            }
            if existing.reference.kind() != reference.kind() && !overwrite {
                return Err(error::store::pin_conflict(
                    key.to_string(),
                    existing.reference.to_string(),
                    reference.to_string(),
                ));
            }
        }

        let resolution = self
            .host(&package)
            .resolve(&package.owner, &package.repo, &reference)?;
        let record = PinRecord::new(reference, resolution.commit_sha, resolution.source_url);
        self.store.set(&key, record.clone())?;
        tracing::info!(
            path = %key,
            reference = %record.reference,
            commit = %record.commit_sha,
            "pinned"
        );
        Ok(record)
    }

    /// Bring the cached artifact for `path` in line with its pin
    pub fn resolve_and_fetch(&self, path: &str) -> Result<FetchReport> {
        let parsed = PackagePath::parse(path)?;
        let key = PathKey::new(parsed.segments())?;
        enter(&key, State::Start);

        let package = match parsed {
            PackagePath::Scaffold { segments } => {
                enter(&key, State::ScaffoldOnly);
                let artifact = self.cache.ensure_scaffold(&segments)?;
                enter(&key, State::Done);
                return Ok(FetchReport {
                    outcome: Outcome::Scaffolded,
                    pin_key: key,
                    artifact,
                    commit_sha: None,
                });
            }
            PackagePath::Package(package) => package,
        };

        let mode = package.mode(&self.config.file_suffix);
        let artifact = self.cache.artifact_path(&package, &mode);
        let package_dir = self.cache.package_dir(&package);

        let _lock = self.cache.lock_package(&package)?;
        self.cache.ensure_scaffold(&key.segments()[..2])?;
        let existing = self.store.get(&key)?;

        enter(&key, State::Resolving);
        let target = match self.target(&package, existing.as_ref()) {
            Ok(target) => target,
            Err(e) => return self.degrade(&package, &mode, key, artifact, existing.as_ref(), e),
        };

        if target.new_record.is_none()
            && self.is_current(&package_dir, &mode, &artifact, &target.commit_sha)?
        {
            enter(&key, State::Skip);
            tracing::debug!(path = %key, commit = %target.commit_sha, "existing version used");
            return Ok(FetchReport {
                outcome: Outcome::Skipped,
                pin_key: key,
                artifact,
                commit_sha: Some(target.commit_sha),
            });
        }

        enter(&key, State::Fetching);
        let fetched = self.fetch(&package, &mode, &package_dir, &artifact, &target.commit_sha);
        let outcome = match fetched {
            Ok(outcome) => outcome,
            Err(e) => return self.degrade(&package, &mode, key, artifact, existing.as_ref(), e),
        };

        if let Some(record) = target.new_record {
            enter(&key, State::Persisting);
            self.store.set(&key, record)?;
        }

        enter(&key, State::Done);
        if outcome != Outcome::Unchanged {
            tracing::info!(path = %key, commit = %target.commit_sha, %outcome, "fetched");
        }
        Ok(FetchReport {
            outcome,
            pin_key: key,
            artifact,
            commit_sha: Some(target.commit_sha),
        })
    }

    /// Pin governing `path`, without touching the network
    pub fn query_pin(&self, path: &str) -> Result<Option<PinRecord>> {
        self.store.get(&store_key(path)?)
    }

    /// Remove the pin governing `path`
    pub fn unpin(&self, path: &str) -> Result<PinRecord> {
        let parsed = PackagePath::parse(path)?;
        let key = PathKey::new(parsed.segments())?;
        let _lock = match &parsed {
            PackagePath::Package(package) => Some(self.cache.lock_package(package)?),
            PackagePath::Scaffold { .. } => None,
        };
        let removed = self.store.delete(&key)?;
        tracing::info!(path = %key, "unpinned");
        Ok(removed)
    }

    /// Read-only view of the pin tree below `prefix`; an empty prefix yields the root
    pub fn pins(&self, prefix: &str) -> Result<Option<Node>> {
        if prefix.trim().trim_matches('/').is_empty() {
            return self.store.subtree(&[]);
        }
        self.store.subtree(PathKey::parse(prefix)?.segments())
    }

    /// Remove every cached package, and the pin store too when `include_pins`
    pub fn clear(&self, include_pins: bool) -> Result<cache::ClearSummary> {
        let mut summary = self.cache.clear()?;
        if include_pins {
            summary.pins_removed = self.store.remove()?;
        }
        tracing::info!(
            packages = summary.packages,
            pins_removed = summary.pins_removed,
            "cache cleared"
        );
        Ok(summary)
    }

    fn host(&self, package: &Package) -> &dyn HostResolver {
        self.resolver.for_host(package.host)
    }

    fn target(&self, package: &Package, existing: Option<&PinRecord>) -> Result<Target> {
        if let Some(name) = &package.git_ref {
            let resolution = self.resolve_qualifier(package, name)?;
            return Ok(Target {
                commit_sha: resolution.commit_sha,
                new_record: None,
            });
        }

        let host = self.host(package);
        match existing {
            None => {
                let branch = host.default_branch(&package.owner, &package.repo)?;
                let reference = RefSpec::Branch(branch);
                let resolution = host.resolve(&package.owner, &package.repo, &reference)?;
                Ok(Target {
                    commit_sha: resolution.commit_sha.clone(),
                    new_record: Some(PinRecord::new(
                        reference,
                        resolution.commit_sha,
                        resolution.source_url,
                    )),
                })
            }
            Some(record) if record.reference.is_floating() => {
                let resolution = host.resolve(&package.owner, &package.repo, &record.reference)?;
                let new_record = (resolution.commit_sha != record.commit_sha).then(|| {
                    PinRecord::new(
                        record.reference.clone(),
                        resolution.commit_sha.clone(),
                        resolution.source_url,
                    )
                });
                Ok(Target {
                    commit_sha: resolution.commit_sha,
                    new_record,
                })
            }
            Some(record) => Ok(Target {
                commit_sha: record.commit_sha.clone(),
                new_record: None,
            }),
        }
    }

    /// Resolve a `repo@ref` qualifier to the first ref kind the host knows
    fn resolve_qualifier(&self, package: &Package, name: &str) -> Result<Resolution> {
        let host = self.host(package);
        for reference in RefSpec::candidates(name) {
            match host.resolve(&package.owner, &package.repo, &reference) {
                Ok(resolution) => return Ok(resolution),
                Err(
                    GhpinError::ReferenceNotFound { .. }
                    | GhpinError::RemoteError {
                        status: Some(404), ..
                    },
                ) => {
                    tracing::debug!(reference = %reference, "no such ref, trying the next kind");
                }
                Err(e) => return Err(e),
            }
        }
        Err(error::remote::reference_not_found(
            &package.owner,
            &package.repo,
            "ref",
            name,
        ))
    }

    /// Commit of the cached artifact according to the package's cache index
    fn cached_commit(&self, package: &Package, mode: &FetchMode) -> Result<Option<String>> {
        let package_dir = self.cache.package_dir(package);
        let file_commit = match mode {
            FetchMode::File { relative_path } => self
                .cache
                .file_record(&package_dir, relative_path)?
                .map(|f| f.commit),
            FetchMode::Archive => None,
        };
        match file_commit {
            Some(commit) => Ok(Some(commit)),
            None => self.cache.archive_commit(&package_dir),
        }
    }

    fn is_current(
        &self,
        package_dir: &Path,
        mode: &FetchMode,
        artifact: &Path,
        sha: &str,
    ) -> Result<bool> {
        if !artifact.exists() {
            return Ok(false);
        }
        let archive_matches = self.cache.archive_commit(package_dir)?.as_deref() == Some(sha);
        Ok(match mode {
            FetchMode::Archive => archive_matches,
            FetchMode::File { relative_path } => {
                archive_matches
                    || self
                        .cache
                        .file_record(package_dir, relative_path)?
                        .is_some_and(|f| f.commit == sha)
            }
        })
    }

    fn fetch(
        &self,
        package: &Package,
        mode: &FetchMode,
        package_dir: &Path,
        artifact: &Path,
        sha: &str,
    ) -> Result<Outcome> {
        let host = self.host(package);
        let swap = match mode {
            FetchMode::Archive => {
                let stored = self.cache.archive_commit(package_dir)?;
                let url = host.archive_url(&package.owner, &package.repo, sha);
                self.cache
                    .compare_and_swap_directory(artifact, sha, stored.as_deref(), |staging| {
                        let bytes = host.fetch_bytes(&url)?;
                        cache::extract_zipball(&bytes, staging)?;
                        Ok(())
                    })?
            }
            FetchMode::File { relative_path } => {
                let url = host.raw_file_url(&package.owner, &package.repo, sha, relative_path);
                let bytes = host.fetch_bytes(&url)?;

                let mut dirs = package.pin_key().segments().to_vec();
                if let Some((_, parents)) = package.module.split_last() {
                    dirs.extend(parents.iter().cloned());
                }
                self.cache.ensure_scaffold(&dirs)?;

                let swap = self.cache.compare_and_swap_file(artifact, &bytes)?;
                self.cache
                    .record_file(package_dir, relative_path, sha, &hash::hash_bytes(&bytes))?;
                swap
            }
        };
        Ok(Outcome::from_swap(swap))
    }

    /// Fall back to an artifact already on disk when the host failed.
    ///
    /// An explicit `repo@ref` never falls back: the cached copy may belong to
    /// another commit.
    fn degrade(
        &self,
        package: &Package,
        mode: &FetchMode,
        key: PathKey,
        artifact: PathBuf,
        existing: Option<&PinRecord>,
        err: GhpinError,
    ) -> Result<FetchReport> {
        enter(&key, State::Failed);
        if !err.is_remote() || !artifact.exists() || package.git_ref.is_some() {
            return Err(err);
        }
        let commit_sha = self
            .cached_commit(package, mode)
            .ok()
            .flatten()
            .or_else(|| existing.map(|r| r.commit_sha.clone()));

        tracing::warn!(path = %key, error = %err, "remote unavailable, using existing version");
        enter(&key, State::Skip);
        Ok(FetchReport {
            outcome: Outcome::Degraded {
                reason: err.to_string(),
            },
            pin_key: key,
            artifact,
            commit_sha,
        })
    }
}

fn enter(key: &PathKey, state: State) {
    tracing::debug!(path = %key, ?state, "fetch state");
}

/// Parse `path` as a complete package path
fn package_path(path: &str) -> Result<Package> {
    match PackagePath::parse(path)? {
        PackagePath::Package(package) => Ok(package),
        PackagePath::Scaffold { .. } => Err(error::path::invalid(
            path,
            "pins apply to a repository: github/owner/repo",
        )),
    }
}

/// Store key governing `path`: the repository pin for package paths, the raw
/// segments otherwise
fn store_key(path: &str) -> Result<PathKey> {
    PathKey::new(PackagePath::parse(path)?.segments())
}
