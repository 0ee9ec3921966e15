// CrashMinder - app/notify.rs
//
// The crash-notifier pipeline: freshness and symbolication gates, system-log
// capture, preference intersection, readiness wait, and dispatch.
//
// Sequential and single-threaded; the only blocking is the bounded
// sleep-poll waiting for the notification service. Every step that needs a
// host facility goes through a seam (Symbolicator, NotificationSink) so the
// pipeline is testable without one.

use crate::app::prefs::Preferences;
use crate::core::report::{CrashClass, CrashReport};
use crate::core::symbolicate::{SymbolicationOutcome, Symbolicator};
use crate::util::constants;
use crate::util::error::{CrashMinderError, NotifyError};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

// =============================================================================
// Gates
// =============================================================================

/// Reject reports outside the freshness window.
///
/// The notifier is only useful seconds after a crash; a stale report means
/// the tool was invoked late (queued invocations after boot, manual runs)
/// and announcing an old crash would only confuse. Future-dated reports
/// (clock skew) count as fresh.
pub fn check_freshness(report: &CrashReport, now: DateTime<Utc>) -> Result<(), NotifyError> {
    let age = report.age_secs(now);
    if age > constants::FRESHNESS_WINDOW_SECS {
        return Err(NotifyError::StaleReport {
            path: report.path.clone(),
            age_secs: age,
            window_secs: constants::FRESHNESS_WINDOW_SECS,
        });
    }
    Ok(())
}

/// Reject reports that have already been symbolicated: a second run over
/// the same crash would re-announce it.
pub fn check_unsymbolicated(report: &CrashReport) -> Result<(), NotifyError> {
    if report.symbolicated {
        return Err(NotifyError::AlreadySymbolicated {
            path: report.path.clone(),
        });
    }
    Ok(())
}

/// Intersect the crash classification with the user's preference toggles.
/// Returns true when a notification should be posted.
pub fn preference_allows(class: CrashClass, prefs: &Preferences) -> bool {
    match class {
        CrashClass::SandboxViolation => prefs.notify_sandbox_violations,
        CrashClass::ExecutionTimeout => prefs.notify_execution_timeouts,
        CrashClass::Other => true,
    }
}

// =============================================================================
// Composition
// =============================================================================

/// A composed local notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Compose the notification for a symbolicated crash.
///
/// The body names the top suspect when the analyzer identified one, and
/// says so plainly when it did not.
pub fn compose(report: &CrashReport, outcome: &SymbolicationOutcome) -> Notification {
    let title = format!("{} quit unexpectedly", report.process_name);
    let body = match outcome.top_suspect() {
        Some(suspect) => format!("\"{suspect}\" is possibly to blame."),
        None => "No likely culprits were identified.".to_string(),
    };
    Notification { title, body }
}

// =============================================================================
// Notification sink
// =============================================================================

/// Dispatch seam for local notifications.
pub trait NotificationSink {
    /// Whether this host has a notification transport at all. A host
    /// without one makes the whole run a no-op skip, not a failure.
    fn available(&self) -> bool;

    /// Whether the notification service is ready to display right now.
    fn ready(&self) -> bool;

    /// Post the notification.
    fn post(&self, note: &Notification) -> Result<(), NotifyError>;
}

/// `notify-send`-backed sink for desktop hosts.
#[derive(Debug, Default)]
pub struct NotifySendSink;

impl NotificationSink for NotifySendSink {
    fn available(&self) -> bool {
        Command::new("which")
            .arg("notify-send")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn ready(&self) -> bool {
        // Probe the freedesktop notification service over the session bus.
        // When gdbus itself is absent the probe cannot run; treat the
        // service as ready rather than spinning the poll loop forever.
        match Command::new("gdbus")
            .args([
                "call",
                "--session",
                "--dest",
                "org.freedesktop.Notifications",
                "--object-path",
                "/org/freedesktop/Notifications",
                "--method",
                "org.freedesktop.Notifications.GetServerInformation",
            ])
            .output()
        {
            Ok(out) => out.status.success(),
            Err(e) => {
                tracing::debug!(error = %e, "gdbus probe unavailable; assuming service ready");
                true
            }
        }
    }

    fn post(&self, note: &Notification) -> Result<(), NotifyError> {
        let output = Command::new("notify-send")
            .args(["--urgency", "critical", "--app-name", constants::APP_NAME])
            .arg(&note.title)
            .arg(&note.body)
            .output()
            .map_err(|e| NotifyError::Dispatch {
                detail: format!("cannot run notify-send: {e}"),
            })?;

        if !output.status.success() {
            return Err(NotifyError::Dispatch {
                detail: format!(
                    "notify-send exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        tracing::info!(title = %note.title, "Notification posted");
        Ok(())
    }
}

// =============================================================================
// Readiness wait
// =============================================================================

/// Wait for the notification service, polling once per interval.
///
/// Once the service first answers, an additional fixed grace delay is slept
/// before returning: a service that has only just come up answers probes
/// before it can actually display anything, and posting immediately loses
/// the notification.
///
/// `sleep` is injected so tests run without wall-clock delays.
pub fn wait_for_ready(
    sink: &dyn NotificationSink,
    mut sleep: impl FnMut(Duration),
) -> Result<(), NotifyError> {
    for attempt in 1..=constants::SERVER_POLL_MAX_ATTEMPTS {
        if sink.ready() {
            tracing::debug!(attempt, "Notification service ready; grace delay");
            sleep(Duration::from_secs(constants::SERVER_GRACE_DELAY_SECS));
            return Ok(());
        }
        sleep(Duration::from_secs(constants::SERVER_POLL_INTERVAL_SECS));
    }
    Err(NotifyError::ServerTimeout {
        attempts: constants::SERVER_POLL_MAX_ATTEMPTS,
    })
}

// =============================================================================
// Pipeline
// =============================================================================

/// What a pipeline run ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Notification dispatched.
    Posted(Notification),
    /// The crash's classification is switched off in preferences.
    Suppressed(&'static str),
    /// This host has no notification transport; nothing to do.
    SkippedNoTransport,
}

/// Run the full notifier pipeline over one crash log file.
///
/// Step order matters and mirrors the browser's expectations:
/// system-log capture happens once, BEFORE symbolication, so the captured
/// lines are the ones closest to the crash.
pub fn run_pipeline(
    log_path: &Path,
    prefs: &Preferences,
    symbolicator: &dyn Symbolicator,
    sink: &dyn NotificationSink,
    syslog_line_budget: usize,
    sleep: impl FnMut(Duration),
) -> Result<NotifyOutcome, CrashMinderError> {
    // 1. Load and parse.
    let content = crate::platform::fs::read_file_lossy(log_path).map_err(|source| {
        CrashMinderError::Io {
            path: log_path.to_path_buf(),
            operation: "read",
            source,
        }
    })?;
    let report = CrashReport::parse(&content, log_path)?;

    // 2. Freshness and symbolication gates.
    check_freshness(&report, Utc::now())?;
    check_unsymbolicated(&report)?;

    // 3. Capture system log context before symbolication.
    crate::core::syslog::capture_to_sibling(
        log_path,
        &report.process_name,
        report.bundle_id.as_deref(),
        syslog_line_budget,
    );

    // 4. Symbolicate.
    let outcome = symbolicator.symbolicate(&report, log_path)?;

    // 5. Preference gate.
    if !preference_allows(report.class, prefs) {
        tracing::info!(
            class = report.class.label(),
            "Notification suppressed by preference"
        );
        return Ok(NotifyOutcome::Suppressed(report.class.label()));
    }

    // 6. Transport and readiness gates, then dispatch.
    if !sink.available() {
        tracing::info!("No notification transport on this host; skipping");
        return Ok(NotifyOutcome::SkippedNoTransport);
    }
    wait_for_ready(sink, sleep)?;

    let note = compose(&report, &outcome);
    sink.post(&note)?;
    Ok(NotifyOutcome::Posted(note))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::CrashReport;
    use chrono::Duration as ChronoDuration;
    use std::cell::RefCell;
    use std::path::PathBuf;

    fn fresh_report(class_header: &str) -> String {
        let date = (Utc::now() - ChronoDuration::seconds(30)).format("%Y-%m-%d %H:%M:%S %z");
        format!("Process: testproc [42]\nIdentifier: com.example.testproc\nDate/Time: {date}\n{class_header}")
    }

    fn parse(content: &str) -> CrashReport {
        CrashReport::parse(content, Path::new("/tmp/testproc.ips")).expect("parse")
    }

    // -- gates ---------------------------------------------------------------

    #[test]
    fn test_fresh_report_passes() {
        let report = parse(&fresh_report(""));
        assert!(check_freshness(&report, Utc::now()).is_ok());
    }

    #[test]
    fn test_stale_report_rejected() {
        let report = parse(&fresh_report(""));
        let later = Utc::now() + ChronoDuration::seconds(constants::FRESHNESS_WINDOW_SECS + 60);
        let err = check_freshness(&report, later).unwrap_err();
        assert!(matches!(err, NotifyError::StaleReport { .. }));
    }

    #[test]
    fn test_future_dated_report_counts_as_fresh() {
        let report = parse(&fresh_report(""));
        let earlier = Utc::now() - ChronoDuration::hours(1);
        assert!(check_freshness(&report, earlier).is_ok());
    }

    #[test]
    fn test_symbolicated_report_rejected() {
        let report = parse(&format!("{}Symbolicated: YES\n", fresh_report("")));
        let err = check_unsymbolicated(&report).unwrap_err();
        assert!(matches!(err, NotifyError::AlreadySymbolicated { .. }));
    }

    #[test]
    fn test_preference_gate_sandbox() {
        let mut prefs = Preferences::default();
        assert!(preference_allows(CrashClass::SandboxViolation, &prefs));
        prefs.notify_sandbox_violations = false;
        assert!(!preference_allows(CrashClass::SandboxViolation, &prefs));
        // Other classes are unaffected by the sandbox toggle.
        assert!(preference_allows(CrashClass::Other, &prefs));
    }

    #[test]
    fn test_preference_gate_timeout() {
        let mut prefs = Preferences::default();
        prefs.notify_execution_timeouts = false;
        assert!(!preference_allows(CrashClass::ExecutionTimeout, &prefs));
        assert!(preference_allows(CrashClass::SandboxViolation, &prefs));
    }

    // -- composition ---------------------------------------------------------

    #[test]
    fn test_compose_names_top_suspect() {
        let report = parse(&fresh_report(""));
        let outcome = SymbolicationOutcome {
            suspects: vec!["libBadTweak.dylib".into(), "UIKit".into()],
            output: None,
        };
        let note = compose(&report, &outcome);
        assert_eq!(note.title, "testproc quit unexpectedly");
        assert!(note.body.contains("libBadTweak.dylib"));
        assert!(!note.body.contains("UIKit"), "only the top suspect is named");
    }

    #[test]
    fn test_compose_without_suspects() {
        let report = parse(&fresh_report(""));
        let outcome = SymbolicationOutcome {
            suspects: vec![],
            output: None,
        };
        let note = compose(&report, &outcome);
        assert!(note.body.contains("No likely culprits"));
    }

    // -- readiness wait ------------------------------------------------------

    /// Sink whose readiness flips to true after a set number of probes.
    struct FlakySink {
        ready_after: u32,
        probes: RefCell<u32>,
        posted: RefCell<Vec<Notification>>,
    }

    impl FlakySink {
        fn new(ready_after: u32) -> Self {
            Self {
                ready_after,
                probes: RefCell::new(0),
                posted: RefCell::new(Vec::new()),
            }
        }
    }

    impl NotificationSink for FlakySink {
        fn available(&self) -> bool {
            true
        }
        fn ready(&self) -> bool {
            *self.probes.borrow_mut() += 1;
            *self.probes.borrow() > self.ready_after
        }
        fn post(&self, note: &Notification) -> Result<(), NotifyError> {
            self.posted.borrow_mut().push(note.clone());
            Ok(())
        }
    }

    #[test]
    fn test_wait_polls_then_sleeps_grace_delay() {
        let sink = FlakySink::new(3);
        let mut slept: Vec<u64> = Vec::new();
        wait_for_ready(&sink, |d| slept.push(d.as_secs())).expect("should become ready");

        // Three 1-second poll sleeps, then the 20-second grace delay.
        assert_eq!(
            slept,
            vec![
                constants::SERVER_POLL_INTERVAL_SECS,
                constants::SERVER_POLL_INTERVAL_SECS,
                constants::SERVER_POLL_INTERVAL_SECS,
                constants::SERVER_GRACE_DELAY_SECS
            ]
        );
    }

    #[test]
    fn test_wait_times_out() {
        struct NeverReady;
        impl NotificationSink for NeverReady {
            fn available(&self) -> bool {
                true
            }
            fn ready(&self) -> bool {
                false
            }
            fn post(&self, _: &Notification) -> Result<(), NotifyError> {
                unreachable!("never ready, never posts")
            }
        }
        let err = wait_for_ready(&NeverReady, |_| {}).unwrap_err();
        assert!(matches!(err, NotifyError::ServerTimeout { .. }));
    }

    // -- pipeline ------------------------------------------------------------

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

    fn write_report(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("testproc-2024-03-05-142107.ips");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_pipeline_posts_for_plain_crash() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, &fresh_report(""));
        let sink = FlakySink::new(0);

        let outcome = run_pipeline(
            &path,
            &Preferences::default(),
            &StubSymbolicator {
                suspects: vec!["libBadTweak.dylib".into()],
            },
            &sink,
            10,
            |_| {},
        )
        .expect("pipeline should succeed");

        match outcome {
            NotifyOutcome::Posted(note) => {
                assert!(note.body.contains("libBadTweak.dylib"));
            }
            other => panic!("expected Posted, got {other:?}"),
        }
        assert_eq!(sink.posted.borrow().len(), 1);
    }

    #[test]
    fn test_pipeline_rejects_stale_report_without_posting() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(
            &dir,
            "Process: testproc [42]\nDate/Time: 2020-01-01 00:00:00 +0000\n",
        );
        let sink = FlakySink::new(0);

        let err = run_pipeline(
            &path,
            &Preferences::default(),
            &StubSymbolicator { suspects: vec![] },
            &sink,
            10,
            |_| {},
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CrashMinderError::Notify(NotifyError::StaleReport { .. })
        ));
        assert!(sink.posted.borrow().is_empty(), "no notification on reject");
    }

    #[test]
    fn test_pipeline_suppresses_sandbox_violation_when_opted_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, &fresh_report("Exception Note: SANDBOX_VIOLATION\n"));
        let sink = FlakySink::new(0);
        let prefs = Preferences {
            notify_sandbox_violations: false,
            ..Default::default()
        };

        let outcome = run_pipeline(
            &path,
            &prefs,
            &StubSymbolicator { suspects: vec![] },
            &sink,
            10,
            |_| {},
        )
        .expect("suppression is a successful run");

        assert!(matches!(outcome, NotifyOutcome::Suppressed(_)));
        assert!(sink.posted.borrow().is_empty());
    }

    #[test]
    fn test_pipeline_posts_sandbox_violation_when_opted_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, &fresh_report("Exception Note: SANDBOX_VIOLATION\n"));
        let sink = FlakySink::new(0);

        let outcome = run_pipeline(
            &path,
            &Preferences::default(),
            &StubSymbolicator { suspects: vec![] },
            &sink,
            10,
            |_| {},
        )
        .expect("pipeline should succeed");
        assert!(matches!(outcome, NotifyOutcome::Posted(_)));
        assert_eq!(sink.posted.borrow().len(), 1);
    }

    #[test]
    fn test_pipeline_skips_without_transport() {
        struct NoTransport;
        impl NotificationSink for NoTransport {
            fn available(&self) -> bool {
                false
            }
            fn ready(&self) -> bool {
                unreachable!("availability is checked first")
            }
            fn post(&self, _: &Notification) -> Result<(), NotifyError> {
                unreachable!("nothing is posted without a transport")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir, &fresh_report(""));
        let outcome = run_pipeline(
            &path,
            &Preferences::default(),
            &StubSymbolicator { suspects: vec![] },
            &NoTransport,
            10,
            |_| {},
        )
        .expect("missing transport is a skip, not a failure");
        assert_eq!(outcome, NotifyOutcome::SkippedNoTransport);
    }
}
