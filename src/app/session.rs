// CrashMinder - app/session.rs
//
// Session persistence: which crash logs the user has already viewed, kept
// between application restarts so unviewed counts stay meaningful.
//
// Same discipline as app::prefs: atomic save, fail-open load, version stamp.
// Paths of deleted logs are pruned on save so the file cannot grow without
// bound as crash logs come and go.

use crate::util::constants::SESSION_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Version stamp for forward-compatibility checks.
pub const SESSION_VERSION: u32 = 1;

/// Complete persistent session snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    /// Schema version — must equal `SESSION_VERSION` to be accepted.
    pub version: u32,

    /// Paths of crash logs the user has opened in the viewer.
    #[serde(default)]
    pub viewed: HashSet<PathBuf>,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            version: SESSION_VERSION,
            viewed: HashSet::new(),
        }
    }

    /// Record that a crash log has been opened.
    pub fn mark_viewed(&mut self, path: &Path) {
        self.viewed.insert(path.to_path_buf());
    }

    /// Whether a crash log has been opened before.
    pub fn is_viewed(&self, path: &Path) -> bool {
        self.viewed.contains(path)
    }

    /// Drop viewed entries whose backing file no longer exists.
    pub fn prune_missing(&mut self) {
        self.viewed.retain(|p| p.exists());
    }
}

/// Resolve the session file path from the platform data directory.
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Save `data` to `path` atomically (write temp → rename).
pub fn save(data: &SessionData, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "cannot create session directory '{}': {e}",
                parent.display()
            )
        })?;
    }

    let json = serde_json::to_string_pretty(data)
        .map_err(|e| format!("failed to serialise session: {e}"))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes())
        .map_err(|e| format!("failed to write session temp file '{}': {e}", tmp.display()))?;

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        format!("failed to finalise session file '{}': {e}", path.display())
    })?;

    tracing::debug!(path = %path.display(), viewed = data.viewed.len(), "Session saved");
    Ok(())
}

/// Load and validate a `SessionData` from `path`.
///
/// Returns `None` on any error (file not found, JSON parse failure,
/// version mismatch). The caller should treat `None` as "start fresh".
pub fn load(path: &Path) -> Option<SessionData> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read session file");
            }
        })
        .ok()?;

    let data: SessionData = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Session file is malformed — starting fresh"
            );
        })
        .ok()?;

    if data.version != SESSION_VERSION {
        tracing::warn!(
            found = data.version,
            expected = SESSION_VERSION,
            "Session file version mismatch — starting fresh"
        );
        return None;
    }

    Some(data)
}

// =============================================================================
// Tests
// =============================================================================
