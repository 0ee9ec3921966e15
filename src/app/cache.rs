// CrashMinder - app/cache.rs
//
// Process-wide crash log group cache.
//
// Groups are discovered by directory scan and served from this cache until
// it is explicitly forgotten: at startup, on user refresh, and after any
// deletion. Groups are never constructed except by the scan, so a forget()
// followed by groups() is the only way the list can change.
//
// Single-threaded by design — the cache lives inside AppState and is only
// touched from the UI thread (the notifier does not browse groups).

use crate::app::session::SessionData;
use crate::core::discovery::{scan_domain, DiscoveryConfig};
use crate::core::model::{CrashLogGroup, OwnerDomain};
use crate::util::error::DiscoveryError;
use std::path::PathBuf;

/// Cached group lists for both owner domains.
#[derive(Debug)]
pub struct GroupCache {
    mobile_dir: PathBuf,
    root_dir: PathBuf,
    config: DiscoveryConfig,

    mobile: Option<Vec<CrashLogGroup>>,
    root: Option<Vec<CrashLogGroup>>,

    /// Warnings accumulated by the most recent scans, for the status bar.
    pub warnings: Vec<String>,
}

impl GroupCache {
    pub fn new(mobile_dir: PathBuf, root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            mobile_dir,
            root_dir,
            config,
            mobile: None,
            root: None,
            warnings: Vec::new(),
        }
    }

    /// Directory backing a domain.
    pub fn dir(&self, domain: OwnerDomain) -> &PathBuf {
        match domain {
            OwnerDomain::Mobile => &self.mobile_dir,
            OwnerDomain::Root => &self.root_dir,
        }
    }

    /// Retarget the mobile domain at a different directory (Open Directory…)
    /// and drop the stale scan.
    pub fn set_mobile_dir(&mut self, dir: PathBuf) {
        self.mobile_dir = dir;
        self.forget();
    }

    /// Groups for a domain, scanning on first access after a forget().
    ///
    /// The session's viewed set is overlaid onto freshly scanned logs so
    /// unviewed counts are correct without the scan knowing about sessions.
    pub fn groups(
        &mut self,
        domain: OwnerDomain,
        session: &SessionData,
    ) -> Result<&[CrashLogGroup], DiscoveryError> {
        let slot = match domain {
            OwnerDomain::Mobile => &mut self.mobile,
            OwnerDomain::Root => &mut self.root,
        };

        if slot.is_none() {
            let dir = match domain {
                OwnerDomain::Mobile => &self.mobile_dir,
                OwnerDomain::Root => &self.root_dir,
            };
            let (mut groups, warnings) = scan_domain(dir, domain, &self.config)?;
            for group in &mut groups {
                for log in &mut group.logs {
                    log.viewed = session.is_viewed(&log.path);
                }
            }
            self.warnings.extend(warnings);
            *slot = Some(groups);
        }

        // The slot was just filled above if it was empty.
        Ok(slot.as_deref().unwrap_or(&[]))
    }

    /// Drop both cached domain lists; the next groups() call rescans.
    pub fn forget(&mut self) {
        self.mobile = None;
        self.root = None;
        self.warnings.clear();
        tracing::debug!("Group cache forgotten");
    }

    /// Total groups across both domains, counting only scanned domains.
    pub fn total_groups(&self) -> usize {
        self.mobile.as_ref().map_or(0, Vec::len) + self.root.as_ref().map_or(0, Vec::len)
    }
}

// =============================================================================
// Tests
// =============================================================================
