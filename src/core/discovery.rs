// CrashMinder - core/discovery.rs
//
// Crash log discovery: directory traversal, filename parsing, and grouping
// by originating process.
//
// Architecture note: this module uses `walkdir` for directory traversal and
// reads only file *metadata* (mtime), never file *contents* — report parsing
// is owned by core::report and only the notifier needs it.
//
// Per-file I/O errors are non-fatal and collected as warnings. A missing
// domain directory yields an empty group list (fail-open): on a machine that
// has never crashed, the directory simply does not exist yet.

use crate::core::model::{is_symbolicated_filename, CrashLog, CrashLogGroup, OwnerDomain};
use crate::util::error::DiscoveryError;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
///
/// All limits reference named constants from `util::constants` so they are
/// auditable in a single place.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of crash logs to return before truncating.
    pub max_files: usize,

    /// Glob patterns (filename-only) that a file MUST match to be included.
    pub include_patterns: Vec<String>,

    /// Glob patterns for files that are never crash reports.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_CRASH_FILE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Filename parsing
// =============================================================================

/// Process name and crash timestamp parsed from a crash log filename.
///
/// Crash reporters name files `Process-2024-01-01-120000.ips` (sometimes
/// with `_` separators, sometimes with a trailing device token). The name is
/// everything before the date; the date is `None` when the filename carries
/// no recognisable timestamp.
pub fn parse_log_filename(file_name: &str) -> (String, Option<DateTime<Utc>>) {
    static NAME_DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_DATE_RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.+?)[-_](?P<date>\d{4}-\d{2}-\d{2}[-_]\d{6})")
            .expect("parse_log_filename: invalid regex")
    });

    if let Some(caps) = re.captures(file_name) {
        let name = caps["name"].to_string();
        let raw = caps["date"].replace('_', "-");
        let date = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d-%H%M%S")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
        return (name, date);
    }

    // No timestamp in the name: group under the first stem component.
    let stem = file_name.split('.').next().unwrap_or(file_name);
    (stem.to_string(), None)
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover crash logs under `root` and group them by originating process.
///
/// Groups are returned sorted by name; logs within a group newest-first.
/// `viewed` flags are left false — the app layer overlays the persisted
/// viewed set after the scan.
///
/// # Non-fatal errors
/// Files that cannot be accessed are recorded as human-readable strings in
/// the returned warnings vector. A missing root directory yields an empty
/// group list plus a warning.
///
/// # Fatal errors
/// Returns `Err` only if the root exists but is not a directory, or is not
/// accessible at all.
pub fn scan_domain(
    root: &Path,
    domain: OwnerDomain,
    config: &DiscoveryConfig,
) -> Result<(Vec<CrashLogGroup>, Vec<String>), DiscoveryError> {
    use crate::util::constants;

    let mut warnings: Vec<String> = Vec::new();

    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warnings.push(format!(
                "{} crash log directory '{}' does not exist",
                domain.label(),
                root.display()
            ));
            return Ok((Vec::new(), warnings));
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            });
        }
        Err(e) => {
            warnings.push(format!("Cannot stat '{}': {e}", root.display()));
            return Ok((Vec::new(), warnings));
        }
    }

    // Clamp config limits to absolute bounds.
    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        domain = domain.label(),
        max_depth,
        max_files,
        "Discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut logs: Vec<CrashLog> = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if exclude_pats.iter().any(|p| p.matches(file_name)) {
            tracing::trace!(file = file_name, "Excluded by pattern");
            continue;
        }
        if !include_pats.is_empty() && !include_pats.iter().any(|p| p.matches(file_name)) {
            tracing::trace!(file = file_name, "Not a crash report");
            continue;
        }

        let (_, filename_date) = parse_log_filename(file_name);
        let date = match filename_date {
            Some(d) => d,
            None => match entry.metadata() {
                Ok(m) => m
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now()),
                Err(e) => {
                    let msg =
                        format!("Cannot read metadata for '{}': {e}", path.display());
                    tracing::debug!(warning = %msg, "Discovery warning");
                    warnings.push(msg);
                    continue;
                }
            },
        };

        logs.push(CrashLog {
            path: path.to_path_buf(),
            date,
            viewed: false,
            symbolicated: is_symbolicated_filename(path),
        });
    }

    let total_found = logs.len();

    // If more logs were found than the configured limit, keep only the
    // `max_files` most recent so the user always sees the freshest crashes.
    if total_found > max_files {
        logs.sort_unstable_by(|a, b| b.date.cmp(&a.date));
        logs.truncate(max_files);
        warnings.push(format!(
            "{total_found} crash logs found in '{}' but the ingest limit is {max_files}. \
             Only the {max_files} most recent have been loaded.",
            root.display()
        ));
        tracing::info!(
            total_found,
            limit = max_files,
            "Crash log list truncated to most recent files"
        );
    }

    // Group by process name. BTreeMap keeps groups sorted by name.
    let mut by_name: BTreeMap<String, Vec<CrashLog>> = BTreeMap::new();
    for log in logs {
        let file_name = log
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let (name, _) = parse_log_filename(file_name);
        by_name.entry(name).or_default().push(log);
    }

    let groups: Vec<CrashLogGroup> = by_name
        .into_iter()
        .map(|(name, mut logs)| {
            logs.sort_unstable_by(|a, b| b.date.cmp(&a.date));
            CrashLogGroup { name, domain, logs }
        })
        .collect();

    tracing::debug!(
        domain = domain.label(),
        groups = groups.len(),
        logs = total_found,
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((groups, warnings))
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile a list of glob pattern strings into `glob::Pattern` objects.
/// Patterns that fail to compile are logged as warnings and skipped.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
