// CrashMinder - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "CrashMinder";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "CrashMinder";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Crash log directories
// =============================================================================

/// Default directory for crash reports from per-user (mobile) processes.
pub const DEFAULT_MOBILE_CRASH_DIR: &str = "/var/mobile/Library/Logs/CrashReporter";

/// Default directory for crash reports from system (root) processes.
pub const DEFAULT_ROOT_CRASH_DIR: &str = "/Library/Logs/CrashReporter";

/// Extension of the captured-system-log sibling written next to a crash log.
pub const SYSLOG_EXTENSION: &str = "syslog";

/// Filename marker present in symbolicated crash reports.
pub const SYMBOLICATED_MARKER: &str = ".symbolicated.";

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery. Crash report
/// directories are flat; depth 2 tolerates one level of per-process subdirs.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Maximum number of crash logs to ingest per domain in a single scan.
pub const DEFAULT_MAX_FILES: usize = 2_000;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 20_000;

/// Hard upper bound on max depth (prevents infinite traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 10;

/// Glob patterns a file must match to be treated as a crash report.
pub const DEFAULT_CRASH_FILE_PATTERNS: &[&str] = &["*.ips", "*.crash", "*.panic"];

/// Glob patterns for files never treated as crash reports.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.syslog", "*.tmp", "LowMemory*"];

// =============================================================================
// Notifier limits
// =============================================================================

/// Reports older than this many seconds are stale and never notified on.
pub const FRESHNESS_WINDOW_SECS: i64 = 120;

/// Interval between notification-service readiness probes.
pub const SERVER_POLL_INTERVAL_SECS: u64 = 1;

/// Maximum number of readiness probes before the wait is abandoned.
pub const SERVER_POLL_MAX_ATTEMPTS: u32 = 300;

/// Extra delay after the notification service first answers. A service that
/// has only just come up accepts probes before it can actually display
/// anything; posting immediately loses the notification.
pub const SERVER_GRACE_DELAY_SECS: u64 = 20;

/// Maximum number of recent system-log lines requested from the host journal.
pub const DEFAULT_SYSLOG_LINE_BUDGET: usize = 2_000;

/// Minimum user-configurable system-log line budget.
pub const MIN_SYSLOG_LINE_BUDGET: usize = 50;

/// Maximum user-configurable system-log line budget.
pub const MAX_SYSLOG_LINE_BUDGET: usize = 50_000;

/// External symbolicator invoked when none is configured.
pub const DEFAULT_SYMBOLICATOR_COMMAND: &str = "symbolicate";

// =============================================================================
// Persistence
// =============================================================================

/// Config file name within the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Session file name within the platform data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Preferences file name within the platform config directory.
pub const PREFS_FILE_NAME: &str = "preferences.json";

/// Marker file created while the GUI runs; found at startup = unclean exit.
pub const RUNNING_MARKER_FILE_NAME: &str = "crashminder.running";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config specify one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
