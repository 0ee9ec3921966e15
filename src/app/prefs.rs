// CrashMinder - app/prefs.rs
//
// Persisted user preferences, shared between the browser GUI (which edits
// them) and the crash-notifier CLI (which reads them).
//
// Design principles:
// - Preferences are saved atomically (write→temp, rename→final) so a crash
//   during save never corrupts the previous good file.
// - Load errors are silently discarded (corrupt or incompatible files just
//   yield the defaults rather than surfacing errors to the user).

use crate::util::constants::PREFS_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version stamp for forward-compatibility checks.
///
/// Increment whenever `Preferences` gains or removes fields in a breaking
/// way. Version mismatches silently fall back to defaults.
pub const PREFS_VERSION: u32 = 1;

/// User preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Schema version — must equal `PREFS_VERSION` to be accepted.
    pub version: u32,

    /// Notify when a crash is classified as a sandbox violation.
    #[serde(default = "default_true")]
    pub notify_sandbox_violations: bool,

    /// Notify when a crash is classified as an execution timeout.
    #[serde(default = "default_true")]
    pub notify_execution_timeouts: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFS_VERSION,
            notify_sandbox_violations: true,
            notify_execution_timeouts: true,
        }
    }
}

/// Resolve the preferences file path from the platform config directory.
pub fn prefs_path(config_dir: &Path) -> PathBuf {
    config_dir.join(PREFS_FILE_NAME)
}

/// Save `prefs` to `path` atomically (write temp → rename).
///
/// Creates all parent directories as needed. Returns a descriptive error
/// string; the caller typically logs it and moves on.
pub fn save(prefs: &Preferences, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "cannot create preferences directory '{}': {e}",
                parent.display()
            )
        })?;
    }

    let json = serde_json::to_string_pretty(prefs)
        .map_err(|e| format!("failed to serialise preferences: {e}"))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes())
        .map_err(|e| format!("failed to write preferences temp file '{}': {e}", tmp.display()))?;

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        format!("failed to finalise preferences file '{}': {e}", path.display())
    })?;

    tracing::debug!(path = %path.display(), "Preferences saved");
    Ok(())
}

/// Load preferences from `path`, falling back to defaults on any error
/// (missing file, malformed JSON, version mismatch).
pub fn load(path: &Path) -> Preferences {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read preferences");
            }
            return Preferences::default();
        }
    };

    let prefs: Preferences = match serde_json::from_str(&content) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Preferences file is malformed — using defaults"
            );
            return Preferences::default();
        }
    };

    if prefs.version != PREFS_VERSION {
        tracing::warn!(
            found = prefs.version,
            expected = PREFS_VERSION,
            "Preferences version mismatch — using defaults"
        );
        return Preferences::default();
    }

    prefs
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_enable_both_toggles() {
        let prefs = Preferences::default();
        assert!(prefs.notify_sandbox_violations);
        assert!(prefs.notify_execution_timeouts);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        let prefs = Preferences {
            version: PREFS_VERSION,
            notify_sandbox_violations: false,
            notify_execution_timeouts: true,
        };

        save(&prefs, &path).expect("save should succeed");
        let loaded = load(&path);
        assert!(!loaded.notify_sandbox_violations);
        assert!(loaded.notify_execution_timeouts);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = load(&dir.path().join("nope.json"));
        assert!(loaded.notify_sandbox_violations);
    }

    #[test]
    fn test_load_malformed_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, b"{{{not json").unwrap();
        let loaded = load(&path);
        assert!(loaded.notify_execution_timeouts);
    }

    #[test]
    fn test_load_wrong_version_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        let mut prefs = Preferences {
            notify_sandbox_violations: false,
            ..Default::default()
        };
        prefs.version = 99;
        save(&prefs, &path).unwrap();
        let loaded = load(&path);
        assert!(
            loaded.notify_sandbox_violations,
            "wrong version must yield defaults"
        );
    }
}
