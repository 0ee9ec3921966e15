// CrashMinder - core/model.rs
//
// Core data model types: crash logs, groups, and owner domains.
// Pure data plus local filesystem removal; no UI, no parsing.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

// =============================================================================
// Owner domain
// =============================================================================

/// The two owner domains crash logs are partitioned into.
///
/// The partition is strict: a group belongs to exactly one domain, determined
/// by which directory its logs were discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerDomain {
    /// Per-user processes (apps and user agents).
    Mobile,
    /// System daemons and privileged processes.
    Root,
}

impl OwnerDomain {
    /// Both domains in display order.
    pub fn all() -> &'static [OwnerDomain] {
        &[OwnerDomain::Mobile, OwnerDomain::Root]
    }

    /// Human-readable section label.
    pub fn label(&self) -> &'static str {
        match self {
            OwnerDomain::Mobile => "Mobile",
            OwnerDomain::Root => "Root",
        }
    }
}

impl std::fmt::Display for OwnerDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Crash log
// =============================================================================

/// One crash report file on disk.
#[derive(Debug, Clone)]
pub struct CrashLog {
    /// Full path to the crash report file.
    pub path: PathBuf,

    /// Crash timestamp, parsed from the filename where possible, otherwise
    /// the file's modification time.
    pub date: DateTime<Utc>,

    /// Whether the user has opened this log in the viewer.
    pub viewed: bool,

    /// Whether the report has been symbolicated (filename marker).
    pub symbolicated: bool,
}

impl CrashLog {
    /// Path of the paired `.syslog` sibling holding captured system-log lines.
    pub fn syslog_path(&self) -> PathBuf {
        syslog_sibling(&self.path)
    }

    /// Delete the backing file and its `.syslog` sibling if one exists.
    ///
    /// The sibling is removed first; a missing sibling is not an error, but
    /// any other failure removing it is logged and ignored — the crash file
    /// itself is the authoritative record.
    pub fn delete(&self) -> Result<(), crate::util::error::RemovalError> {
        let sibling = self.syslog_path();
        match std::fs::remove_file(&sibling) {
            Ok(()) => tracing::debug!(path = %sibling.display(), "Removed syslog sibling"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %sibling.display(), error = %e, "Cannot remove syslog sibling");
            }
        }

        std::fs::remove_file(&self.path).map_err(|source| {
            crate::util::error::RemovalError::LogFile {
                path: self.path.clone(),
                source,
            }
        })?;

        tracing::info!(path = %self.path.display(), "Crash log deleted");
        Ok(())
    }
}

/// The `.syslog` sibling path for a crash log.
///
/// The sibling is a full-name sibling (`foo.ips` -> `foo.ips.syslog`) so the
/// pairing survives crash files whose stem contains dots.
pub fn syslog_sibling(log_path: &Path) -> PathBuf {
    let mut name = log_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(constants::SYSLOG_EXTENSION);
    log_path.with_file_name(name)
}

/// Returns true when `path` names a symbolicated crash report.
pub fn is_symbolicated_filename(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.contains(constants::SYMBOLICATED_MARKER))
}

// =============================================================================
// Crash log group
// =============================================================================

/// A named collection of crash logs sharing one originating process, within
/// one owner domain. Logs are ordered newest-first.
///
/// Groups are only ever constructed by the directory scan
/// (`core::discovery::scan_domain`); nothing else creates them.
#[derive(Debug, Clone)]
pub struct CrashLogGroup {
    /// Originating process name (derived from crash log filenames).
    pub name: String,

    /// Owner domain this group's logs were discovered in.
    pub domain: OwnerDomain,

    /// Contained crash logs, newest first.
    pub logs: Vec<CrashLog>,
}

impl CrashLogGroup {
    /// Total number of crash logs in this group.
    pub fn total(&self) -> usize {
        self.logs.len()
    }

    /// Number of logs the user has not yet opened.
    pub fn unviewed(&self) -> usize {
        self.logs.iter().filter(|l| !l.viewed).count()
    }

    /// Most recent crash timestamp in the group, if any logs remain.
    pub fn latest_date(&self) -> Option<DateTime<Utc>> {
        self.logs.first().map(|l| l.date)
    }

    /// Delete every crash log in this group.
    ///
    /// Returns `Ok(())` only if all deletions succeeded. Partial failure is
    /// aggregated into a single `PartialGroup` error — individual failures
    /// are logged, not surfaced per-item.
    pub fn delete(&self) -> Result<(), crate::util::error::RemovalError> {
        let total = self.logs.len();
        let mut failed = 0usize;

        for log in &self.logs {
            if let Err(e) = log.delete() {
                tracing::warn!(group = %self.name, error = %e, "Deletion failed");
                failed += 1;
            }
        }

        if failed > 0 {
            Err(crate::util::error::RemovalError::PartialGroup {
                group: self.name.clone(),
                failed,
                total,
            })
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
