//! End-to-end fetch behavior against a scripted host

mod common;

use std::fs;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use common::{API, Harness, RAW};
use ghpin::config::Config;
use ghpin::error::{GhpinError, Result};
use ghpin::fetch::{Orchestrator, Outcome};
use ghpin::reference::RefSpec;
use ghpin::resolver::{HttpResponse, Transport};
use ghpin::test_fixtures::ScriptedTransport;
use tempfile::TempDir;

fn script_main(h: &Harness, sha: &str, files: &[(&str, &[u8])]) {
    h.transport.repo(API, "octo", "demo", "main");
    h.transport.branch(API, "octo", "demo", "main", sha);
    h.transport.zipball(API, "octo", "demo", sha, files);
}

#[test]
fn scenario_a_first_fetch_installs_and_pins_branch() {
    let h = Harness::new();
    script_main(&h, "abc123", &[("demo.py", b"VERSION = 1\n")]);

    let report = h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    assert_eq!(report.outcome, Outcome::Installed);
    assert_eq!(report.artifact, h.path("github/octo/demo"));
    assert!(h.path("github/octo/demo/demo.py").is_file());
    assert!(h.path("github/.ghpin-package").is_file());
    assert!(h.path("github/octo/.ghpin-package").is_file());
    assert!(h.path("github/octo/demo/.ghpin-package").is_file());

    let doc: serde_json::Value = serde_json::from_slice(&h.store_bytes()).unwrap();
    assert_eq!(
        doc["github"]["octo"]["demo"],
        serde_json::json!({
            "id": "pin",
            "branch": "main",
            "commit": {
                "sha": "abc123",
                "url": "https://api.test/repos/octo/demo/branches/main"
            }
        })
    );
}

#[test]
fn scenario_b_unchanged_head_skips_without_touching_anything() {
    let h = Harness::new();
    script_main(&h, "abc123", &[("demo.py", b"VERSION = 1\n")]);
    h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();

    let store_before = h.store_bytes();
    let cache_before = h.snapshot("github");
    h.transport.clear_requests();

    let report = h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    assert_eq!(report.outcome, Outcome::Skipped);
    assert_eq!(report.commit_sha.as_deref(), Some("abc123"));
    assert_eq!(h.store_bytes(), store_before);
    assert_eq!(h.snapshot("github"), cache_before);
    assert_eq!(h.transport.count_matching("zipball"), 0);
    assert_eq!(
        h.transport.requests(),
        vec!["https://api.test/repos/octo/demo/branches/main"]
    );
}

#[test]
fn scenario_c_moved_head_replaces_directory_and_updates_pin() {
    let h = Harness::new();
    script_main(&h, "abc123", &[("old.py", b"VERSION = 1\n")]);
    h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();

    h.transport.branch(API, "octo", "demo", "main", "def456");
    h.transport
        .zipball(API, "octo", "demo", "def456", &[("new.py", b"VERSION = 2\n")]);

    let report = h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    assert_eq!(report.outcome, Outcome::Updated);
    assert!(h.path("github/octo/demo/new.py").is_file());
    assert!(!h.path("github/octo/demo/old.py").exists());

    let pin = h.orchestrator.query_pin("github/octo/demo").unwrap().unwrap();
    assert_eq!(pin.commit_sha, "def456");
    assert_eq!(pin.reference, RefSpec::Branch("main".to_string()));

    // Exactly one transition: the next call is a skip
    let report = h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    assert_eq!(report.outcome, Outcome::Skipped);
    assert_eq!(h.transport.count_matching("zipball/def456"), 1);
}

#[test]
fn scenario_d_missing_tag_leaves_store_and_cache_as_before() {
    let h = Harness::new();
    script_main(&h, "abc123", &[("demo.py", b"VERSION = 1\n")]);
    h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    h.transport.tags(API, "octo", "demo", &[("v0.9", "0a0a0a")]);

    let store_before = h.store_bytes();
    let cache_before = h.snapshot("github");

    let err = h
        .orchestrator
        .pin("github/octo/demo", RefSpec::Tag("v1.0".to_string()), true)
        .unwrap_err();
    assert!(matches!(err, GhpinError::ReferenceNotFound { ref name, .. } if name == "v1.0"));
    assert_eq!(h.store_bytes(), store_before);
    assert_eq!(h.snapshot("github"), cache_before);
}

#[test]
fn scenario_d_missing_tag_on_empty_store_writes_nothing() {
    let h = Harness::new();
    h.transport.tags(API, "octo", "demo", &[]);

    let err = h
        .orchestrator
        .pin("github/octo/demo", RefSpec::Tag("v1.0".to_string()), false)
        .unwrap_err();
    assert!(matches!(err, GhpinError::ReferenceNotFound { .. }));
    assert!(!h.path("pins.json").exists());
    assert!(!h.path("github/octo/demo").exists());
}

#[test]
fn sha_pin_is_never_looked_up_again() {
    let h = Harness::new();
    h.transport.commit(API, "octo", "demo", "abc123");
    h.transport
        .zipball(API, "octo", "demo", "abc123", &[("demo.py", b"x")]);

    h.orchestrator
        .pin("github/octo/demo", RefSpec::Sha("abc123".to_string()), false)
        .unwrap();
    let record_before = h.store_bytes();
    h.transport.clear_requests();

    let first = h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    let second = h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    assert_eq!(first.outcome, Outcome::Installed);
    assert_eq!(second.outcome, Outcome::Skipped);

    assert_eq!(h.transport.count_matching("/commits/"), 0);
    assert_eq!(h.transport.count_matching("/branches/"), 0);
    assert_eq!(h.transport.requests(), vec!["https://api.test/repos/octo/demo/zipball/abc123"]);
    assert_eq!(h.store_bytes(), record_before);
}

#[test]
fn tag_pin_fetches_files_by_commit_not_tag_name() {
    let h = Harness::with_config(|c| c.file_suffix = ".py".to_string());
    h.transport.tags(API, "octo", "demo", &[("v1.0", "abc123")]);
    h.transport
        .raw(RAW, "octo", "demo", "abc123", "util/strings.py", b"def f(): pass\n");

    h.orchestrator
        .pin("github/octo/demo", RefSpec::Tag("v1.0".to_string()), false)
        .unwrap();
    let report = h
        .orchestrator
        .resolve_and_fetch("github/octo/demo/util/strings")
        .unwrap();

    assert_eq!(report.outcome, Outcome::Installed);
    assert_eq!(report.artifact, h.path("github/octo/demo/util/strings.py"));
    assert_eq!(h.transport.count_matching("/v1.0/"), 0);
}

#[test]
fn archive_covers_module_paths_at_same_commit() {
    let h = Harness::with_config(|c| c.file_suffix = ".py".to_string());
    script_main(&h, "abc123", &[("util/strings.py", b"def f(): pass\n")]);
    h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    h.transport.clear_requests();

    let report = h
        .orchestrator
        .resolve_and_fetch("github/octo/demo/util/strings")
        .unwrap();
    assert_eq!(report.outcome, Outcome::Skipped);
    assert_eq!(h.transport.count_matching(RAW), 0);
}

#[test]
fn pins_for_sibling_repositories_are_independent() {
    let h = Harness::new();
    h.transport.branch(API, "octo", "demo", "main", "aaa111");
    h.transport.branch(API, "octo", "tools", "main", "bbb222");

    h.orchestrator
        .pin("github/octo/demo", RefSpec::Branch("main".to_string()), false)
        .unwrap();
    h.orchestrator
        .pin("github/octo/tools", RefSpec::Branch("main".to_string()), false)
        .unwrap();
    h.orchestrator.unpin("github/octo/demo").unwrap();

    let tools = h.orchestrator.query_pin("github/octo/tools").unwrap().unwrap();
    assert_eq!(tools.commit_sha, "bbb222");
    assert!(h.orchestrator.query_pin("github/octo/demo").unwrap().is_none());
}

#[test]
fn unpin_of_internal_node_is_rejected_byte_for_byte() {
    let h = Harness::new();
    h.transport.branch(API, "octo", "demo", "main", "abc123");
    h.orchestrator
        .pin("github/octo/demo", RefSpec::Branch("main".to_string()), false)
        .unwrap();
    let before = h.store_bytes();

    for path in ["github", "github/octo"] {
        let err = h.orchestrator.unpin(path).unwrap_err();
        assert!(matches!(err, GhpinError::NotAPin { .. }), "{path}: {err:?}");
    }
    let err = h.orchestrator.unpin("github/nobody/demo").unwrap_err();
    assert!(matches!(err, GhpinError::NoSuchPath { .. }));
    assert_eq!(h.store_bytes(), before);
}

#[test]
fn host_outage_keeps_existing_version() {
    let h = Harness::new();
    script_main(&h, "abc123", &[("demo.py", b"VERSION = 1\n")]);
    h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    let store_before = h.store_bytes();
    let cache_before = h.snapshot("github");

    h.transport.fail(
        "https://api.test/repos/octo/demo/branches/main",
        "request timed out: https://api.test/repos/octo/demo/branches/main",
    );
    let report = h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    match &report.outcome {
        Outcome::Degraded { reason } => assert!(reason.contains("timed out")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(h.store_bytes(), store_before);
    assert_eq!(h.snapshot("github"), cache_before);
}

#[test]
fn scaffold_paths_never_reach_the_host() {
    let h = Harness::new();
    for path in ["github", "github/octo", "/github/octo/"] {
        let report = h.orchestrator.resolve_and_fetch(path).unwrap();
        assert_eq!(report.outcome, Outcome::Scaffolded);
    }
    assert_eq!(h.transport.request_count(), 0);
    assert!(!h.path("pins.json").exists());
}

#[test]
fn unsupported_host_is_rejected_before_any_request() {
    let h = Harness::new();
    let err = h.orchestrator.resolve_and_fetch("gitlab/octo/demo").unwrap_err();
    assert!(matches!(err, GhpinError::UnsupportedHost { .. }));
    assert_eq!(h.transport.request_count(), 0);
}

#[test]
fn ref_qualifier_fetches_once_and_leaves_the_pin() {
    let h = Harness::new();
    script_main(&h, "abc123", &[("demo.py", b"VERSION = 1\n")]);
    h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    let store_before = h.store_bytes();

    h.transport.tags(API, "octo", "demo", &[("v2.0", "def456")]);
    h.transport
        .zipball(API, "octo", "demo", "def456", &[("demo.py", b"VERSION = 2\n")]);

    let report = h.orchestrator.resolve_and_fetch("github/octo/demo@v2.0").unwrap();
    assert_eq!(report.outcome, Outcome::Updated);
    assert_eq!(report.commit_sha.as_deref(), Some("def456"));
    assert_eq!(report.pin_key.to_string(), "github/octo/demo");
    assert_eq!(fs::read(h.path("github/octo/demo/demo.py")).unwrap(), b"VERSION = 2\n");
    assert_eq!(h.store_bytes(), store_before);
    // Not a branch, so the tag list decides
    assert_eq!(h.transport.count_matching("/branches/v2.0"), 1);

    // A plain fetch goes back to the pinned commit
    let report = h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    assert_eq!(report.outcome, Outcome::Updated);
    assert_eq!(fs::read(h.path("github/octo/demo/demo.py")).unwrap(), b"VERSION = 1\n");
}

#[test]
fn sha_qualifier_fetches_a_module_without_creating_a_pin() {
    let h = Harness::with_config(|c| c.file_suffix = ".py".to_string());
    h.transport.commit(API, "octo", "demo", "3f2a9c1");
    h.transport
        .raw(RAW, "octo", "demo", "3f2a9c1", "util.py", b"def f(): pass\n");

    let report = h
        .orchestrator
        .resolve_and_fetch("github/octo/demo@3f2a9c1/util")
        .unwrap();
    assert_eq!(report.outcome, Outcome::Installed);
    assert_eq!(report.artifact, h.path("github/octo/demo/util.py"));
    assert_eq!(h.transport.count_matching("/branches/"), 0);
    assert_eq!(h.transport.count_matching("/repos/octo/demo/commits/3f2a9c1"), 1);
    assert!(!h.path("pins.json").exists());
}

#[test]
fn unknown_ref_qualifier_fails_even_with_a_cached_copy() {
    let h = Harness::new();
    script_main(&h, "abc123", &[("demo.py", b"VERSION = 1\n")]);
    h.orchestrator.resolve_and_fetch("github/octo/demo").unwrap();
    h.transport.tags(API, "octo", "demo", &[]);
    let store_before = h.store_bytes();
    let cache_before = h.snapshot("github");

    let err = h
        .orchestrator
        .resolve_and_fetch("github/octo/demo@nope")
        .unwrap_err();
    assert!(matches!(err, GhpinError::ReferenceNotFound { ref name, .. } if name == "nope"));
    assert_eq!(h.store_bytes(), store_before);
    assert_eq!(h.snapshot("github"), cache_before);
}

#[test]
fn pin_rejects_a_ref_qualifier() {
    let h = Harness::new();
    let err = h
        .orchestrator
        .pin("github/octo/demo@v1.0", RefSpec::Tag("v1.0".to_string()), false)
        .unwrap_err();
    assert!(matches!(err, GhpinError::InvalidPath { .. }));
    assert_eq!(h.transport.request_count(), 0);
}

#[test]
fn degraded_module_reports_the_commit_it_was_fetched_at() {
    let h = Harness::with_config(|c| c.file_suffix = ".py".to_string());
    h.transport.repo(API, "octo", "demo", "main");
    h.transport.branch(API, "octo", "demo", "main", "abc123");
    h.transport.raw(RAW, "octo", "demo", "abc123", "a.py", b"a1");
    h.orchestrator.resolve_and_fetch("github/octo/demo/a").unwrap();

    h.transport.branch(API, "octo", "demo", "main", "def456");
    h.transport.raw(RAW, "octo", "demo", "def456", "b.py", b"b2");
    h.orchestrator.resolve_and_fetch("github/octo/demo/b").unwrap();

    h.transport.fail(
        "https://api.test/repos/octo/demo/branches/main",
        "request timed out: https://api.test/repos/octo/demo/branches/main",
    );
    let report = h.orchestrator.resolve_and_fetch("github/octo/demo/a").unwrap();
    assert!(matches!(report.outcome, Outcome::Degraded { .. }));
    assert_eq!(report.commit_sha.as_deref(), Some("abc123"));

    let pin = h.orchestrator.query_pin("github/octo/demo").unwrap().unwrap();
    assert_eq!(pin.commit_sha, "def456");
}

/// Scripted transport that parks requests for one URL until released
struct HeldTransport {
    inner: ScriptedTransport,
    held: String,
    reached: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl Transport for HeldTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        if url.contains(&self.held) {
            let _ = self.reached.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
        }
        self.inner.get(url)
    }
}

#[test]
fn explicit_pin_during_a_fetch_is_kept() {
    let temp = TempDir::new().unwrap();
    let mut config = Config::with_base_dir(temp.path());
    config.api_url = API.to_string();
    config.raw_url = RAW.to_string();

    let scripted = ScriptedTransport::new();
    scripted.repo(API, "octo", "demo", "main");
    scripted.branch(API, "octo", "demo", "main", "abc123");
    scripted.zipball(API, "octo", "demo", "abc123", &[("demo.py", b"x")]);
    scripted.tags(API, "octo", "demo", &[("v1.0", "0a0a0a")]);

    let (reached_tx, reached_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let transport = HeldTransport {
        inner: scripted,
        held: "zipball/abc123".to_string(),
        reached: Mutex::new(reached_tx),
        release: Mutex::new(release_rx),
    };
    let orchestrator = Orchestrator::new(config, Arc::new(transport));

    thread::scope(|scope| {
        let fetch = scope.spawn(|| orchestrator.resolve_and_fetch("github/octo/demo"));
        reached_rx.recv().unwrap();

        let pin = scope.spawn(|| {
            orchestrator.pin("github/octo/demo", RefSpec::Tag("v1.0".to_string()), true)
        });
        thread::sleep(Duration::from_millis(100));
        release_tx.send(()).unwrap();

        fetch.join().unwrap().unwrap();
        pin.join().unwrap().unwrap();
    });

    let pin = orchestrator.query_pin("github/octo/demo").unwrap().unwrap();
    assert_eq!(pin.reference, RefSpec::Tag("v1.0".to_string()));
    assert_eq!(pin.commit_sha, "0a0a0a");
}
