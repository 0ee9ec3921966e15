// CrashMinder - core/syslog.rs
//
// System-log capture for crashed processes.
//
// The notifier captures matching journal lines ONCE, before symbolication:
// symbolication can take long enough that the journal rotates or the stream
// moves on, and capturing first pins the lines closest to the crash.
//
// The line filter is a pure function over text so it is testable without a
// host journal; the `Command`-backed collector is a thin wrapper around
// `journalctl`.

use std::path::Path;
use std::process::Command;

/// Syslog line shapes handled by the sender match:
///   `Mar 05 14:21:07 host sender[123]: message`
///   `Mar 05 14:21:07 host sender: message`
///
/// The sender field is the 5th whitespace-separated token. Matching is
/// exact and case-sensitive on the tag, with an optional `[pid]` suffix.
fn line_sender(line: &str) -> Option<&str> {
    let tag = line.split_whitespace().nth(4)?;
    let tag = tag.strip_suffix(':').unwrap_or(tag);
    match tag.find('[') {
        Some(idx) => Some(&tag[..idx]),
        None => Some(tag),
    }
}

/// Returns true when `line` was emitted by the crashed process: its sender
/// tag equals the process name or the bundle identifier.
pub fn matches_sender(line: &str, process_name: &str, bundle_id: Option<&str>) -> bool {
    let Some(sender) = line_sender(line) else {
        return false;
    };
    if sender == process_name {
        return true;
    }
    bundle_id.is_some_and(|b| sender == b)
}

/// Filter `lines` down to those emitted by the crashed process.
pub fn filter_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    process_name: &str,
    bundle_id: Option<&str>,
) -> Vec<String> {
    lines
        .into_iter()
        .filter(|l| matches_sender(l, process_name, bundle_id))
        .map(str::to_string)
        .collect()
}

/// Collect the most recent `line_budget` lines from the host journal.
///
/// Failure is reported as a warning string rather than an error: missing
/// system-log context must never block the notification itself.
pub fn collect_journal_lines(line_budget: usize) -> Result<Vec<String>, String> {
    let output = Command::new("journalctl")
        .args(["-o", "short", "--no-pager", "-n"])
        .arg(line_budget.to_string())
        .output()
        .map_err(|e| format!("cannot run journalctl: {e}"))?;

    if !output.status.success() {
        return Err(format!("journalctl failed: {}", output.status));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text.lines().map(str::to_string).collect())
}

/// Capture the crashed process's system-log lines and write them to the
/// crash log's `.syslog` sibling. An empty capture writes nothing.
///
/// Returns the number of lines written. All failures are logged warnings;
/// the caller proceeds regardless.
pub fn capture_to_sibling(
    log_path: &Path,
    process_name: &str,
    bundle_id: Option<&str>,
    line_budget: usize,
) -> usize {
    let lines = match collect_journal_lines(line_budget) {
        Ok(lines) => lines,
        Err(msg) => {
            tracing::warn!(warning = %msg, "System log capture unavailable");
            return 0;
        }
    };

    let matched = filter_lines(lines.iter().map(String::as_str), process_name, bundle_id);
    if matched.is_empty() {
        tracing::debug!(process = process_name, "No matching system log lines");
        return 0;
    }

    let sibling = crate::core::model::syslog_sibling(log_path);
    let body = matched.join("\n") + "\n";
    match std::fs::write(&sibling, body) {
        Ok(()) => {
            tracing::info!(
                path = %sibling.display(),
                lines = matched.len(),
                "System log captured"
            );
            matched.len()
        }
        Err(e) => {
            tracing::warn!(path = %sibling.display(), error = %e, "Cannot write syslog sibling");
            0
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const JOURNAL: &str = "\
Mar 05 14:20:59 phone MobileSafari[5847]: tab crashed, reloading
Mar 05 14:21:01 phone kernel: memorystatus: killing pid 5847
Mar 05 14:21:02 phone com.apple.mobilesafari: extension checkin failed
Mar 05 14:21:03 phone backupd[91]: backup complete
Mar 05 14:21:04 phone MobileSafariSettings[60]: pref sync
";

    #[test]
    fn test_matches_process_name_with_pid_suffix() {
        assert!(matches_sender(
            "Mar 05 14:20:59 phone MobileSafari[5847]: tab crashed",
            "MobileSafari",
            None
        ));
    }

    #[test]
    fn test_matches_bundle_id_without_pid() {
        assert!(matches_sender(
            "Mar 05 14:21:02 phone com.apple.mobilesafari: extension checkin failed",
            "MobileSafari",
            Some("com.apple.mobilesafari")
        ));
    }

    #[test]
    fn test_prefix_sender_does_not_match() {
        // MobileSafariSettings must not match MobileSafari: exact tag only.
        assert!(!matches_sender(
            "Mar 05 14:21:04 phone MobileSafariSettings[60]: pref sync",
            "MobileSafari",
            None
        ));
    }

    #[test]
    fn test_short_line_does_not_match() {
        assert!(!matches_sender("garbage", "MobileSafari", None));
    }

    #[test]
    fn test_filter_lines_keeps_only_crashed_process() {
        let matched = filter_lines(
            JOURNAL.lines(),
            "MobileSafari",
            Some("com.apple.mobilesafari"),
        );
        assert_eq!(matched.len(), 2);
        assert!(matched[0].contains("tab crashed"));
        assert!(matched[1].contains("extension checkin failed"));
    }

    #[test]
    fn test_capture_writes_sibling() {
        // Exercise the sibling-path and write logic directly: filter + write
        // is what capture_to_sibling does after collection.
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("MobileSafari-2024-03-05-142107.ips");
        let matched = filter_lines(JOURNAL.lines(), "MobileSafari", None);
        let sibling = crate::core::model::syslog_sibling(&log_path);
        std::fs::write(&sibling, matched.join("\n")).unwrap();

        assert_eq!(
            sibling.file_name().unwrap().to_str().unwrap(),
            "MobileSafari-2024-03-05-142107.ips.syslog"
        );
        let body = std::fs::read_to_string(&sibling).unwrap();
        assert!(body.contains("tab crashed"));
        assert!(!body.contains("backup complete"));
    }
}
