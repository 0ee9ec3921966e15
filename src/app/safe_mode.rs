// CrashMinder - app/safe_mode.rs
//
// Unclean-shutdown detection via a running-marker file.
//
// The GUI writes the marker at startup and removes it on clean exit. A
// marker already present at startup means the previous run never reached
// its exit path — most likely the browser itself crashed — and the UI
// surfaces a one-time safe-mode notice.

use crate::util::constants::RUNNING_MARKER_FILE_NAME;
use std::path::{Path, PathBuf};

/// Resolve the marker path inside the platform data directory.
pub fn marker_path(data_dir: &Path) -> PathBuf {
    data_dir.join(RUNNING_MARKER_FILE_NAME)
}

/// Returns true when a marker from a previous run is present.
pub fn previous_run_crashed(marker: &Path) -> bool {
    marker.exists()
}

/// Create the running marker. The marker body is the pid, purely to aid
/// manual inspection; only the file's existence is meaningful.
pub fn write_marker(marker: &Path) {
    if let Some(parent) = marker.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "Cannot create data directory");
            return;
        }
    }
    if let Err(e) = std::fs::write(marker, format!("{}\n", std::process::id())) {
        tracing::warn!(path = %marker.display(), error = %e, "Cannot write running marker");
    } else {
        tracing::debug!(path = %marker.display(), "Running marker written");
    }
}

/// Remove the running marker on clean exit. A missing marker is fine.
pub fn clear_marker(marker: &Path) {
    match std::fs::remove_file(marker) {
        Ok(()) => tracing::debug!(path = %marker.display(), "Running marker cleared"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %marker.display(), error = %e, "Cannot clear running marker");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
