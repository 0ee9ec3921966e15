// CrashMinder - core/report.rs
//
// Crash report header parsing.
//
// Core layer: accepts report text, never touches the filesystem directly.
// Only the headers the browser and notifier need are parsed; the body
// (threads, binary images) is left to the external symbolicator.

use crate::util::error::ReportError;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Accepted `Date/Time` header formats, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z", // 2024-01-01 12:00:00.000 +0000
    "%Y-%m-%d %H:%M:%S %z",    // 2024-01-01 12:00:00 +0000
    "%Y-%m-%d %H:%M:%S%.f",    // no zone: assumed UTC
    "%Y-%m-%d %H:%M:%S",
];

/// Watchdog exception code marking an execution timeout.
const WATCHDOG_TIMEOUT_CODE: &str = "0x8badf00d";

// =============================================================================
// Classification
// =============================================================================

/// Coarse crash classification used by the notifier's preference gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashClass {
    /// The process was killed for violating its sandbox profile.
    SandboxViolation,
    /// The process was killed by the watchdog for exceeding its time budget.
    ExecutionTimeout,
    /// Everything else.
    Other,
}

impl CrashClass {
    /// Human-readable label for status lines and logs.
    pub fn label(&self) -> &'static str {
        match self {
            CrashClass::SandboxViolation => "sandbox violation",
            CrashClass::ExecutionTimeout => "execution timeout",
            CrashClass::Other => "crash",
        }
    }
}

// =============================================================================
// Parsed report
// =============================================================================

/// Header fields extracted from a crash report file.
#[derive(Debug, Clone)]
pub struct CrashReport {
    /// Path of the report file (for error context and the syslog sibling).
    pub path: PathBuf,

    /// Name of the crashed process.
    pub process_name: String,

    /// Process ID at crash time, when the header carried one.
    pub pid: Option<u32>,

    /// Bundle identifier of the crashed process, when present.
    pub bundle_id: Option<String>,

    /// Crash timestamp from the `Date/Time` header.
    pub date: DateTime<Utc>,

    /// `OS Version` header, verbatim.
    pub os_version: Option<String>,

    /// `Exception Type` header, verbatim.
    pub exception_type: Option<String>,

    /// `Exception Codes` header, verbatim.
    pub exception_codes: Option<String>,

    /// Whether the report header declares itself symbolicated.
    pub symbolicated: bool,

    /// Crash classification derived from the headers.
    pub class: CrashClass,
}

impl CrashReport {
    /// Parse the headers of a crash report.
    ///
    /// `Process` and `Date/Time` are required; everything else is optional.
    /// `path` is used only for error context and is not read.
    pub fn parse(content: &str, path: &Path) -> Result<CrashReport, ReportError> {
        if content.trim().is_empty() {
            return Err(ReportError::NotACrashReport {
                path: path.to_path_buf(),
            });
        }

        let (process_name, pid) = match header_value(content, "Process") {
            Some(raw) => split_process(&raw),
            None => {
                return Err(ReportError::MissingField {
                    path: path.to_path_buf(),
                    field: "Process",
                })
            }
        };

        let raw_date = header_value(content, "Date/Time").ok_or(ReportError::MissingField {
            path: path.to_path_buf(),
            field: "Date/Time",
        })?;
        let date = parse_date(&raw_date).ok_or_else(|| ReportError::BadTimestamp {
            path: path.to_path_buf(),
            raw: raw_date.clone(),
        })?;

        let bundle_id = header_value(content, "Identifier");
        let os_version = header_value(content, "OS Version");
        let exception_type = header_value(content, "Exception Type");
        let exception_codes = header_value(content, "Exception Codes");
        let exception_note = header_value(content, "Exception Note");

        let symbolicated = header_value(content, "Symbolicated")
            .is_some_and(|v| v.eq_ignore_ascii_case("yes"))
            || crate::core::model::is_symbolicated_filename(path);

        let class = classify(
            exception_type.as_deref(),
            exception_codes.as_deref(),
            exception_note.as_deref(),
            content,
        );

        tracing::debug!(
            process = %process_name,
            date = %date,
            class = class.label(),
            symbolicated,
            "Crash report parsed"
        );

        Ok(CrashReport {
            path: path.to_path_buf(),
            process_name,
            pid,
            bundle_id,
            date,
            os_version,
            exception_type,
            exception_codes,
            symbolicated,
            class,
        })
    }

    /// Seconds elapsed between the crash and `now`. Negative when the report
    /// timestamp is in the future (clock skew); callers treat that as fresh.
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.date).num_seconds()
    }
}

// =============================================================================
// Header helpers
// =============================================================================

/// Extract the value of a `Key:   value` header line.
///
/// Only the first match counts; crash reports repeat no header before the
/// thread listing, and scanning stops at the first blank-line-separated body
/// would cost more than it saves on these small files.
fn header_value(content: &str, key: &str) -> Option<String> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix(key) {
            if let Some(value) = rest.strip_prefix(':') {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Split a `Process` header value into name and optional pid.
/// Accepted shapes: `MobileSafari [1234]`, `MobileSafari`.
fn split_process(raw: &str) -> (String, Option<u32>) {
    static PROCESS_RE: OnceLock<Regex> = OnceLock::new();
    let re = PROCESS_RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.+?)\s*\[(?P<pid>\d+)\]\s*$")
            .expect("split_process: invalid regex")
    });

    match re.captures(raw) {
        Some(caps) => {
            let name = caps["name"].trim().to_string();
            let pid = caps["pid"].parse().ok();
            (name, pid)
        }
        None => (raw.trim().to_string(), None),
    }
}

/// Try each accepted `Date/Time` format in order.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    for fmt in DATE_FORMATS {
        if fmt.contains("%z") {
            if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
        } else if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    None
}

/// Derive the crash class from header fields.
///
/// Sandbox kills carry either an explicit `SANDBOX_VIOLATION` exception note
/// or a `Sandbox Violation` section in the body. Watchdog kills carry the
/// 0x8badf00d code.
fn classify(
    exception_type: Option<&str>,
    exception_codes: Option<&str>,
    exception_note: Option<&str>,
    content: &str,
) -> CrashClass {
    let note_is_sandbox = exception_note.is_some_and(|n| n.contains("SANDBOX_VIOLATION"));
    let type_is_sandbox = exception_type.is_some_and(|t| t.to_uppercase().contains("SANDBOX"));
    if note_is_sandbox || type_is_sandbox || content.contains("Sandbox Violation") {
        return CrashClass::SandboxViolation;
    }

    if exception_codes.is_some_and(|c| c.to_lowercase().contains(WATCHDOG_TIMEOUT_CODE)) {
        return CrashClass::ExecutionTimeout;
    }

    CrashClass::Other
}

// =============================================================================
// Tests
// =============================================================================
