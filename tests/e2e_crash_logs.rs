// CrashMinder - tests/e2e_crash_logs.rs
//
// End-to-end tests for the crash log pipeline.
//
// These tests exercise the real filesystem, real walkdir traversal, real
// filename/date parsing, and the real notifier pipeline with in-test seams
// for the symbolicator and the notification sink — no host services needed.

use chrono::Utc;
use crashminder::app::cache::GroupCache;
use crashminder::app::notify::{
    run_pipeline, Notification, NotificationSink, NotifyOutcome,
};
use crashminder::app::prefs::Preferences;
use crashminder::app::session::SessionData;
use crashminder::app::state::{DetailSection, DetailState};
use crashminder::core::discovery::DiscoveryConfig;
use crashminder::core::model::OwnerDomain;
use crashminder::core::report::CrashReport;
use crashminder::core::symbolicate::{SymbolicationOutcome, Symbolicator};
use crashminder::util::error::{CrashMinderError, NotifyError};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

/// Write a minimal crash report whose crash date is `age_secs` in the past.
fn write_crash_log(dir: &Path, name: &str, age_secs: i64, extra: &str) -> PathBuf {
    let date = (Utc::now() - chrono::Duration::seconds(age_secs))
        .format("%Y-%m-%d %H:%M:%S %z");
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            "Process:         testproc [42]\n\
             Identifier:      com.example.testproc\n\
             Date/Time:       {date}\n\
             OS Version:      Test OS 1.0\n\
             {extra}"
        ),
    )
    .expect("write crash log");
    path
}

struct StubSymbolicator {
    suspects: Vec<String>,
}

impl Symbolicator for StubSymbolicator {
    fn symbolicate(
        &self,
        _report: &CrashReport,
        _log_path: &Path,
    ) -> Result<SymbolicationOutcome, NotifyError> {
        Ok(SymbolicationOutcome {
            suspects: self.suspects.clone(),
            output: None,
        })
    }
}

/// Always-ready sink recording what was posted.
struct RecordingSink {
    posted: RefCell<Vec<Notification>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            posted: RefCell::new(Vec::new()),
        }
    }
}

impl NotificationSink for RecordingSink {
    fn available(&self) -> bool {
        true
    }
    fn ready(&self) -> bool {
        true
    }
    fn post(&self, note: &Notification) -> Result<(), NotifyError> {
        self.posted.borrow_mut().push(note.clone());
        Ok(())
    }
}

// =============================================================================
// Browser-side E2E: scan → detail → delete
// =============================================================================

/// Scanning two domain directories, drilling into a group, deleting the
/// Latest row, then deleting the whole group must leave the directories
/// empty and the section math consistent at every step.
#[test]
fn e2e_scan_detail_delete_flow() {
    let mobile = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    for day in 1..=3 {
        fs::write(
            mobile.path().join(format!("Safari-2024-03-0{day}-120000.ips")),
            "Process: Safari [1]\n",
        )
        .unwrap();
    }
    fs::write(
        root.path().join("backupd-2024-03-01-050000.crash"),
        "Process: backupd [9]\n",
    )
    .unwrap();

    let mut cache = GroupCache::new(
        mobile.path().to_path_buf(),
        root.path().to_path_buf(),
        DiscoveryConfig::default(),
    );
    let session = SessionData::new();

    let mobile_groups = cache.groups(OwnerDomain::Mobile, &session).unwrap().to_vec();
    assert_eq!(mobile_groups.len(), 1);
    assert_eq!(mobile_groups[0].name, "Safari");
    assert_eq!(mobile_groups[0].total(), 3);
    assert_eq!(mobile_groups[0].unviewed(), 3);

    // Detail view: Latest holds the newest log, Earlier the other two.
    let mut detail = DetailState::new(&mobile_groups[0]);
    assert_eq!(detail.latest_rows(), 1);
    assert_eq!(detail.earlier_rows(), 2);

    let promoted = detail
        .log_at(DetailSection::Earlier, 0)
        .unwrap()
        .path
        .clone();
    detail.delete(DetailSection::Latest, 0).unwrap();
    assert_eq!(detail.log_at(DetailSection::Latest, 0).unwrap().path, promoted);
    assert_eq!(detail.earlier_rows(), 1);

    // Rescan sees two remaining logs, then group deletion clears the rest.
    cache.forget();
    let remaining = cache.groups(OwnerDomain::Mobile, &session).unwrap().to_vec();
    assert_eq!(remaining[0].total(), 2);
    remaining[0].delete().expect("group deletion should succeed");

    cache.forget();
    assert!(cache.groups(OwnerDomain::Mobile, &session).unwrap().is_empty());

    // The root domain was never touched.
    assert_eq!(cache.groups(OwnerDomain::Root, &session).unwrap().len(), 1);
}

/// A group with one undeletable log must report partial failure while still
/// removing the logs it can.
#[test]
fn e2e_group_deletion_aggregates_partial_failure() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("app-2024-03-01-120000.ips"),
        "Process: app [1]\n",
    )
    .unwrap();

    let mut cache = GroupCache::new(
        dir.path().to_path_buf(),
        TempDir::new().unwrap().path().to_path_buf(),
        DiscoveryConfig::default(),
    );
    let session = SessionData::new();
    let mut group = cache.groups(OwnerDomain::Mobile, &session).unwrap()[0].clone();

    // Sabotage: point one log at a file that does not exist.
    let mut ghost = group.logs[0].clone();
    ghost.path = dir.path().join("ghost.ips");
    group.logs.push(ghost);

    let err = group.delete().expect_err("partial failure expected");
    assert!(
        err.to_string().contains("1 of 2"),
        "aggregate error should summarise counts, got: {err}"
    );
    assert!(
        !dir.path().join("app-2024-03-01-120000.ips").exists(),
        "deletable log must still be removed"
    );
}

// =============================================================================
// Notifier E2E
// =============================================================================

#[test]
fn e2e_notifier_posts_for_fresh_crash_and_writes_no_syslog_on_empty_capture() {
    let dir = TempDir::new().unwrap();
    let path = write_crash_log(dir.path(), "testproc-2024-03-05-142107.ips", 10, "");
    let sink = RecordingSink::new();

    let outcome = run_pipeline(
        &path,
        &Preferences::default(),
        &StubSymbolicator {
            suspects: vec!["libBadTweak.dylib".into()],
        },
        &sink,
        50,
        |_| {},
    )
    .expect("pipeline should succeed");

    match outcome {
        NotifyOutcome::Posted(note) => {
            assert_eq!(note.title, "testproc quit unexpectedly");
            assert!(note.body.contains("libBadTweak.dylib"));
        }
        other => panic!("expected Posted, got {other:?}"),
    }
    assert_eq!(sink.posted.borrow().len(), 1);
}

#[test]
fn e2e_notifier_rejects_stale_report() {
    let dir = TempDir::new().unwrap();
    let path = write_crash_log(dir.path(), "testproc-2024-03-05-142107.ips", 600, "");
    let sink = RecordingSink::new();

    let err = run_pipeline(
        &path,
        &Preferences::default(),
        &StubSymbolicator { suspects: vec![] },
        &sink,
        50,
        |_| {},
    )
    .expect_err("stale report must be rejected");

    assert!(matches!(
        err,
        CrashMinderError::Notify(NotifyError::StaleReport { .. })
    ));
    assert!(sink.posted.borrow().is_empty());
}

#[test]
fn e2e_notifier_rejects_already_symbolicated_report() {
    let dir = TempDir::new().unwrap();
    let path = write_crash_log(
        dir.path(),
        "testproc-2024-03-05-142107.ips",
        10,
        "Symbolicated: YES\n",
    );
    let sink = RecordingSink::new();

    let err = run_pipeline(
        &path,
        &Preferences::default(),
        &StubSymbolicator { suspects: vec![] },
        &sink,
        50,
        |_| {},
    )
    .expect_err("symbolicated report must be rejected");

    assert!(matches!(
        err,
        CrashMinderError::Notify(NotifyError::AlreadySymbolicated { .. })
    ));
    assert!(sink.posted.borrow().is_empty());
}

#[test]
fn e2e_notifier_sandbox_preference_gates_dispatch() {
    let dir = TempDir::new().unwrap();
    let sink = RecordingSink::new();

    // Opted out: suppressed, nothing posted, but the run succeeds.
    let path = write_crash_log(
        dir.path(),
        "sandboxed-2024-03-05-142107.ips",
        10,
        "Exception Note: SANDBOX_VIOLATION\n",
    );
    let prefs_off = Preferences {
        notify_sandbox_violations: false,
        ..Default::default()
    };
    let outcome = run_pipeline(
        &path,
        &prefs_off,
        &StubSymbolicator { suspects: vec![] },
        &sink,
        50,
        |_| {},
    )
    .expect("suppression is a successful run");
    assert!(matches!(outcome, NotifyOutcome::Suppressed(_)));
    assert!(sink.posted.borrow().is_empty());

    // Opted in: the same crash posts.
    let outcome = run_pipeline(
        &path,
        &Preferences::default(),
        &StubSymbolicator { suspects: vec![] },
        &sink,
        50,
        |_| {},
    )
    .expect("pipeline should succeed");
    assert!(matches!(outcome, NotifyOutcome::Posted(_)));
    assert_eq!(sink.posted.borrow().len(), 1);
}

#[test]
fn e2e_notifier_missing_file_is_an_error() {
    let sink = RecordingSink::new();
    let err = run_pipeline(
        Path::new("/nonexistent/crashminder-e2e/x.ips"),
        &Preferences::default(),
        &StubSymbolicator { suspects: vec![] },
        &sink,
        50,
        |_| {},
    )
    .expect_err("missing file must fail");
    assert!(matches!(err, CrashMinderError::Io { .. }));
}
