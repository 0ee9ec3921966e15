// CrashMinder - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors preserve the causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all CrashMinder operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum CrashMinderError {
    /// Crash report parsing failed.
    Report(ReportError),

    /// Crash log discovery failed.
    Discovery(DiscoveryError),

    /// Crash log or group removal failed.
    Removal(RemovalError),

    /// Notification pipeline failed.
    Notify(NotifyError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for CrashMinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report(e) => write!(f, "Report error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Removal(e) => write!(f, "Removal error: {e}"),
            Self::Notify(e) => write!(f, "Notifier error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for CrashMinderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Report(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Removal(e) => Some(e),
            Self::Notify(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors related to crash report loading and parsing.
#[derive(Debug)]
pub enum ReportError {
    /// A required header field is missing from the report.
    MissingField { path: PathBuf, field: &'static str },

    /// The Date/Time header could not be parsed with any accepted format.
    BadTimestamp { path: PathBuf, raw: String },

    /// The file is empty or contains no recognisable report header.
    NotACrashReport { path: PathBuf },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { path, field } => {
                write!(
                    f,
                    "'{}': missing required header '{field}'",
                    path.display()
                )
            }
            Self::BadTimestamp { path, raw } => {
                write!(f, "'{}': cannot parse Date/Time '{raw}'", path.display())
            }
            Self::NotACrashReport { path } => {
                write!(f, "'{}' does not look like a crash report", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {}

impl From<ReportError> for CrashMinderError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to crash log discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The domain path exists but is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the domain directory.
    PermissionDenied { path: PathBuf, source: io::Error },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADirectory { path } => {
                write!(f, "Crash log path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for CrashMinderError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Removal errors
// ---------------------------------------------------------------------------

/// Errors related to deleting crash logs and groups.
#[derive(Debug)]
pub enum RemovalError {
    /// The crash log file itself could not be removed.
    LogFile { path: PathBuf, source: io::Error },

    /// One or more logs in a group could not be removed.
    /// `failed` of `total` deletions did not complete.
    PartialGroup {
        group: String,
        failed: usize,
        total: usize,
    },
}

impl fmt::Display for RemovalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogFile { path, source } => {
                write!(f, "Cannot delete '{}': {source}", path.display())
            }
            Self::PartialGroup {
                group,
                failed,
                total,
            } => write!(
                f,
                "Group '{group}': {failed} of {total} crash logs could not be deleted"
            ),
        }
    }
}

impl std::error::Error for RemovalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LogFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RemovalError> for CrashMinderError {
    fn from(e: RemovalError) -> Self {
        Self::Removal(e)
    }
}

// ---------------------------------------------------------------------------
// Notifier errors
// ---------------------------------------------------------------------------

/// Errors raised by the crash-notifier pipeline.
#[derive(Debug)]
pub enum NotifyError {
    /// The report's crash date is outside the freshness window.
    StaleReport {
        path: PathBuf,
        age_secs: i64,
        window_secs: i64,
    },

    /// The report has already been symbolicated; nothing to announce.
    AlreadySymbolicated { path: PathBuf },

    /// The external symbolicator could not be run.
    SymbolicatorLaunch {
        command: String,
        source: io::Error,
    },

    /// The external symbolicator ran but reported failure.
    SymbolicatorFailed { command: String, status: String },

    /// The symbolicator's stdout was not the expected JSON shape.
    SymbolicatorOutput {
        command: String,
        source: serde_json::Error,
    },

    /// The notification service never became ready within the poll budget.
    ServerTimeout { attempts: u32 },

    /// The notification could not be dispatched.
    Dispatch { detail: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleReport {
                path,
                age_secs,
                window_secs,
            } => write!(
                f,
                "'{}' is {age_secs}s old, outside the {window_secs}s freshness window",
                path.display()
            ),
            Self::AlreadySymbolicated { path } => {
                write!(f, "'{}' is already symbolicated", path.display())
            }
            Self::SymbolicatorLaunch { command, source } => {
                write!(f, "Cannot launch symbolicator '{command}': {source}")
            }
            Self::SymbolicatorFailed { command, status } => {
                write!(f, "Symbolicator '{command}' failed: {status}")
            }
            Self::SymbolicatorOutput { command, source } => {
                write!(f, "Symbolicator '{command}' produced malformed output: {source}")
            }
            Self::ServerTimeout { attempts } => {
                write!(
                    f,
                    "Notification service not ready after {attempts} probes"
                )
            }
            Self::Dispatch { detail } => {
                write!(f, "Notification dispatch failed: {detail}")
            }
        }
    }
}

impl std::error::Error for NotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SymbolicatorLaunch { source, .. } => Some(source),
            Self::SymbolicatorOutput { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<NotifyError> for CrashMinderError {
    fn from(e: NotifyError) -> Self {
        Self::Notify(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for CrashMinderError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for CrashMinder results.
pub type Result<T> = std::result::Result<T, CrashMinderError>;
