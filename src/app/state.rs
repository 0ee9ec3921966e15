// CrashMinder - app/state.rs
//
// Application state management. Holds the group cache, session, preferences,
// the current view (group list or per-group detail), and the pending-action
// flags the panels set for the next frame.
// Owned by the eframe::App implementation.

use crate::app::cache::GroupCache;
use crate::app::prefs::Preferences;
use crate::app::session::SessionData;
use crate::core::model::{CrashLog, CrashLogGroup, OwnerDomain};
use std::path::PathBuf;

// =============================================================================
// Detail view state
// =============================================================================

/// Section identifiers in the per-group detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSection {
    /// The single most recent crash log.
    Latest,
    /// Everything older, second-most-recent first.
    Earlier,
}

/// Per-group detail view: one group's logs split into a Latest section
/// (one row) and an Earlier section (the remainder).
///
/// Deleting the Latest row does not rebuild this model. Instead the
/// `deleted_row_zero` flag shifts every index computation by one: the
/// next-most-recent log becomes the new Latest and the Earlier section
/// shrinks by exactly one row. Rebuilding from scratch would also work, but
/// re-deriving section boundaries on every frame made the original
/// implementation lose scroll position and selection; the flag preserves
/// the snapshot.
#[derive(Debug, Clone)]
pub struct DetailState {
    /// Group name shown in the title.
    pub group_name: String,

    /// Domain the group came from.
    pub domain: OwnerDomain,

    /// Snapshot of the group's logs, newest first. Entries removed from the
    /// Earlier section are dropped from this vec; a removed Latest row is
    /// instead masked by `deleted_row_zero`.
    logs: Vec<CrashLog>,

    /// Set when the original row zero (the Latest at snapshot time) has been
    /// deleted; all index math offsets by one from then on.
    deleted_row_zero: bool,
}

impl DetailState {
    pub fn new(group: &CrashLogGroup) -> Self {
        Self {
            group_name: group.name.clone(),
            domain: group.domain,
            logs: group.logs.clone(),
            deleted_row_zero: false,
        }
    }

    fn offset(&self) -> usize {
        usize::from(self.deleted_row_zero)
    }

    /// Number of logs still present.
    pub fn remaining(&self) -> usize {
        self.logs.len() - self.offset()
    }

    /// Rows in the Latest section: one, or zero once the group is empty.
    pub fn latest_rows(&self) -> usize {
        self.remaining().min(1)
    }

    /// Rows in the Earlier section.
    pub fn earlier_rows(&self) -> usize {
        self.remaining().saturating_sub(1)
    }

    /// Index into `logs` for a section row.
    fn log_index(&self, section: DetailSection, row: usize) -> usize {
        match section {
            DetailSection::Latest => self.offset(),
            DetailSection::Earlier => self.offset() + 1 + row,
        }
    }

    /// The log at a section row, if it exists.
    pub fn log_at(&self, section: DetailSection, row: usize) -> Option<&CrashLog> {
        self.logs.get(self.log_index(section, row))
    }

    /// Mark the log at a section row viewed (in this snapshot).
    pub fn mark_viewed(&mut self, section: DetailSection, row: usize) {
        let idx = self.log_index(section, row);
        if let Some(log) = self.logs.get_mut(idx) {
            log.viewed = true;
        }
    }

    /// Delete the log backing a section row.
    ///
    /// On success the section model is adjusted in place: the first Latest
    /// deletion sets `deleted_row_zero`; any other deletion removes the
    /// entry outright. Index math stays consistent in both cases.
    pub fn delete(
        &mut self,
        section: DetailSection,
        row: usize,
    ) -> Result<(), crate::util::error::RemovalError> {
        let idx = self.log_index(section, row);
        let Some(log) = self.logs.get(idx) else {
            return Ok(()); // row raced away; nothing to do
        };
        log.delete()?;

        match section {
            DetailSection::Latest if !self.deleted_row_zero => {
                self.deleted_row_zero = true;
            }
            _ => {
                self.logs.remove(idx);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Views and transient dialogs
// =============================================================================

/// Which screen the central panel shows.
#[derive(Debug)]
pub enum View {
    /// The two-section group list.
    GroupList,
    /// One group's crash logs.
    Detail(DetailState),
}

/// Contents of the crash log viewer window.
#[derive(Debug)]
pub struct LogViewer {
    pub title: String,
    pub content: String,
}

// =============================================================================
// Application state
// =============================================================================

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Crash log group cache for both domains.
    pub cache: GroupCache,

    /// Viewed-log session, persisted across launches.
    pub session: SessionData,

    /// Where the session is saved.
    pub session_path: PathBuf,

    /// Notifier preference toggles, editable in the Options window.
    pub prefs: Preferences,

    /// Where the preferences are saved.
    pub prefs_path: PathBuf,

    /// Running-marker path for safe-mode detection.
    pub marker_path: PathBuf,

    /// Current screen.
    pub view: View,

    /// Modal alert text; rendered until dismissed.
    pub alert: Option<String>,

    /// One-time notice that the previous run exited uncleanly.
    pub safe_mode_notice: bool,

    /// Crash log content viewer, when open.
    pub viewer: Option<LogViewer>,

    /// Whether the Options window is open.
    pub show_options: bool,

    /// Whether the delete-all confirmation dialog is open.
    pub confirm_delete_all: bool,

    /// Status message for the status bar.
    pub status_message: String,

    // ---- Pending actions set by panels, handled at the top of the next
    // frame so panels never mutate the cache mid-render. ----
    /// Open this group in the detail view.
    pub pending_open_group: Option<(OwnerDomain, String)>,
    /// Delete this group.
    pub pending_delete_group: Option<(OwnerDomain, String)>,
    /// Delete every group in both domains.
    pub pending_delete_all: bool,
    /// Forget the cache and rescan.
    pub pending_refresh: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cache: GroupCache,
        session: SessionData,
        session_path: PathBuf,
        prefs: Preferences,
        prefs_path: PathBuf,
        marker_path: PathBuf,
        safe_mode_notice: bool,
        debug_mode: bool,
    ) -> Self {
        Self {
            cache,
            session,
            session_path,
            prefs,
            prefs_path,
            marker_path,
            view: View::GroupList,
            alert: None,
            safe_mode_notice,
            viewer: None,
            show_options: false,
            confirm_delete_all: false,
            status_message: "Ready.".to_string(),
            pending_open_group: None,
            pending_delete_group: None,
            pending_delete_all: false,
            pending_refresh: false,
            debug_mode,
        }
    }

    /// Forget the cache so the next frame rescans both domains.
    pub fn refresh(&mut self) {
        self.cache.forget();
        self.status_message = "Rescanned crash log directories.".to_string();
    }

    /// Enter the detail view for a group, snapshotting its current logs.
    pub fn open_group(&mut self, domain: OwnerDomain, name: &str) {
        let group = match self.cache.groups(domain, &self.session) {
            Ok(groups) => groups.iter().find(|g| g.name == name).cloned(),
            Err(e) => {
                self.alert = Some(format!("Cannot read crash logs: {e}"));
                return;
            }
        };
        match group {
            Some(group) => {
                self.view = View::Detail(DetailState::new(&group));
            }
            None => {
                // The group vanished between render and click; rescan.
                self.cache.forget();
            }
        }
    }

    /// Leave the detail view. Deletions there invalidated the cache already;
    /// an untouched visit keeps the cached scan.
    pub fn close_detail(&mut self) {
        self.view = View::GroupList;
    }

    /// Delete one group's files. Partial failure raises the modal alert; the
    /// cache is forgotten either way so the list reflects what remains.
    pub fn delete_group(&mut self, domain: OwnerDomain, name: &str) {
        let group = match self.cache.groups(domain, &self.session) {
            Ok(groups) => groups.iter().find(|g| g.name == name).cloned(),
            Err(e) => {
                self.alert = Some(format!("Cannot read crash logs: {e}"));
                return;
            }
        };
        if let Some(group) = group {
            match group.delete() {
                Ok(()) => {
                    self.status_message = format!("Deleted crash logs for '{name}'.");
                }
                Err(e) => {
                    tracing::warn!(group = name, error = %e, "Group deletion incomplete");
                    self.alert = Some(format!("Could not delete all crash logs: {e}"));
                }
            }
        }
        self.cache.forget();
        self.session.prune_missing();
        self.save_session();
    }

    /// Delete every group in both domains, tolerating per-group failure and
    /// surfacing one aggregate alert at the end.
    pub fn delete_all(&mut self) {
        let mut all_ok = true;
        let mut deleted = 0usize;

        for &domain in OwnerDomain::all() {
            let groups = match self.cache.groups(domain, &self.session) {
                Ok(groups) => groups.to_vec(),
                Err(e) => {
                    tracing::warn!(domain = domain.label(), error = %e, "Cannot scan for delete-all");
                    all_ok = false;
                    continue;
                }
            };
            for group in groups {
                match group.delete() {
                    Ok(()) => deleted += 1,
                    Err(e) => {
                        tracing::warn!(group = %group.name, error = %e, "Deletion failed");
                        all_ok = false;
                    }
                }
            }
        }

        self.cache.forget();
        self.session.prune_missing();
        self.save_session();

        if all_ok {
            self.status_message = format!("Deleted {deleted} crash log group(s).");
        } else {
            self.alert =
                Some("Some crash logs could not be deleted. The list has been rescanned.".to_string());
        }
    }

    /// Open a crash log in the viewer and mark it viewed (persisted).
    /// Returns false when the file could not be read.
    pub fn open_log(&mut self, log: &CrashLog) -> bool {
        match crate::platform::fs::read_file_lossy(&log.path) {
            Ok(content) => {
                let title = log
                    .path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("Crash log")
                    .to_string();
                self.viewer = Some(LogViewer { title, content });
                self.session.mark_viewed(&log.path);
                self.save_session();
                true
            }
            Err(e) => {
                self.alert = Some(format!("Cannot read '{}': {e}", log.path.display()));
                false
            }
        }
    }

    /// Persist the session; failures are logged, never surfaced.
    pub fn save_session(&self) {
        if let Err(e) = crate::app::session::save(&self.session, &self.session_path) {
            tracing::warn!(error = %e, "Session save failed");
        }
    }

    /// Persist the preferences; failures are logged, never surfaced.
    pub fn save_prefs(&self) {
        if let Err(e) = crate::app::prefs::save(&self.prefs, &self.prefs_path) {
            tracing::warn!(error = %e, "Preferences save failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    /// Build a group of `n` logs with real backing files, newest first.
    fn group_with_files(dir: &TempDir, n: usize) -> CrashLogGroup {
        let mut logs = Vec::new();
        for i in (0..n).rev() {
            let path = dir.path().join(format!("app-2024-03-0{}-120000.ips", i + 1));
            fs::write(&path, "Process: app [1]\n").unwrap();
            logs.push(CrashLog {
                path,
                date: Utc.with_ymd_and_hms(2024, 3, (i + 1) as u32, 12, 0, 0).unwrap(),
                viewed: false,
                symbolicated: false,
            });
        }
        CrashLogGroup {
            name: "app".to_string(),
            domain: OwnerDomain::Mobile,
            logs,
        }
    }

    #[test]
    fn test_initial_section_split() {
        let dir = TempDir::new().unwrap();
        let detail = DetailState::new(&group_with_files(&dir, 3));
        assert_eq!(detail.latest_rows(), 1);
        assert_eq!(detail.earlier_rows(), 2);
        // Latest is the newest; Earlier row 0 the second-newest.
        let latest = detail.log_at(DetailSection::Latest, 0).unwrap();
        let second = detail.log_at(DetailSection::Earlier, 0).unwrap();
        assert!(latest.date > second.date);
    }

    /// Deleting the Latest row promotes the second-most-recent log to
    /// Latest and shrinks Earlier by exactly one, without a rebuild.
    #[test]
    fn test_delete_latest_shifts_sections() {
        let dir = TempDir::new().unwrap();
        let mut detail = DetailState::new(&group_with_files(&dir, 3));

        let old_second = detail
            .log_at(DetailSection::Earlier, 0)
            .unwrap()
            .path
            .clone();

        detail
            .delete(DetailSection::Latest, 0)
            .expect("delete should succeed");

        assert_eq!(detail.latest_rows(), 1);
        assert_eq!(detail.earlier_rows(), 1, "Earlier must shrink by one");
        assert_eq!(
            detail.log_at(DetailSection::Latest, 0).unwrap().path,
            old_second,
            "second-most-recent log must become the new Latest"
        );
    }

    #[test]
    fn test_delete_latest_twice() {
        let dir = TempDir::new().unwrap();
        let mut detail = DetailState::new(&group_with_files(&dir, 3));
        let oldest = detail
            .log_at(DetailSection::Earlier, 1)
            .unwrap()
            .path
            .clone();

        detail.delete(DetailSection::Latest, 0).unwrap();
        detail.delete(DetailSection::Latest, 0).unwrap();

        assert_eq!(detail.latest_rows(), 1);
        assert_eq!(detail.earlier_rows(), 0);
        assert_eq!(detail.log_at(DetailSection::Latest, 0).unwrap().path, oldest);
    }

    #[test]
    fn test_delete_earlier_row_after_latest_deleted() {
        let dir = TempDir::new().unwrap();
        let mut detail = DetailState::new(&group_with_files(&dir, 4));

        detail.delete(DetailSection::Latest, 0).unwrap();
        // Earlier now holds logs 3 and 4 (by age); delete its first row.
        let target = detail
            .log_at(DetailSection::Earlier, 0)
            .unwrap()
            .path
            .clone();
        detail.delete(DetailSection::Earlier, 0).unwrap();

        assert!(!target.exists(), "backing file must be removed");
        assert_eq!(detail.latest_rows(), 1);
        assert_eq!(detail.earlier_rows(), 1);
    }

    #[test]
    fn test_delete_until_empty() {
        let dir = TempDir::new().unwrap();
        let mut detail = DetailState::new(&group_with_files(&dir, 2));
        detail.delete(DetailSection::Latest, 0).unwrap();
        detail.delete(DetailSection::Latest, 0).unwrap();
        assert_eq!(detail.remaining(), 0);
        assert_eq!(detail.latest_rows(), 0);
        assert_eq!(detail.earlier_rows(), 0);
        assert!(detail.log_at(DetailSection::Latest, 0).is_none());
    }

    #[test]
    fn test_delete_failure_keeps_sections_intact() {
        let dir = TempDir::new().unwrap();
        let mut detail = DetailState::new(&group_with_files(&dir, 2));
        // Remove the backing file behind the model's back.
        let latest_path = detail.log_at(DetailSection::Latest, 0).unwrap().path.clone();
        fs::remove_file(&latest_path).unwrap();

        assert!(detail.delete(DetailSection::Latest, 0).is_err());
        assert_eq!(
            detail.latest_rows(),
            1,
            "failed deletion must not shift sections"
        );
        assert_eq!(detail.earlier_rows(), 1);
    }
}
