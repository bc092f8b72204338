//! Snapshot cache for expensive upstream fetches.
//!
//! Mailbox snapshots are keyed by `(source id, session window)`. Rosters do
//! not depend on the window and are keyed by source id alone. Nothing
//! expires on its own: a stale snapshot stays until `invalidate`,
//! `invalidate_source` or `clear`.
//!
//! A single `hwcheck run` fetches each snapshot once. The cache pays off for
//! callers that keep it across runs, e.g. re-checking several windows
//! against one roster.

use std::collections::HashMap;
use std::sync::Arc;

use homework_recon::{ClassRoster, EmailRecord};

use crate::source::{EmailSource, RosterSource, SourceError};
use crate::window::SessionWindow;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub source: String,
    pub window: SessionWindow,
}

impl SnapshotKey {
    pub fn new(source: impl Into<String>, window: SessionWindow) -> Self {
        Self {
            source: source.into(),
            window,
        }
    }

    /// Key of a roster snapshot, which is shared by every window.
    pub fn roster(source: impl Into<String>) -> Self {
        Self::new(source, SessionWindow::unbounded())
    }
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    rosters: HashMap<SnapshotKey, Arc<ClassRoster>>,
    emails: HashMap<SnapshotKey, Arc<Vec<EmailRecord>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached roster, fetching on first use. Failed fetches are not cached.
    pub fn roster(&mut self, source: &dyn RosterSource) -> Result<Arc<ClassRoster>, SourceError> {
        let key = SnapshotKey::roster(source.id());
        if let Some(hit) = self.rosters.get(&key) {
            log::debug!("cache hit: {} ({})", key.source, key.window);
            return Ok(Arc::clone(hit));
        }
        let roster = Arc::new(source.fetch_roster()?);
        self.rosters.insert(key, Arc::clone(&roster));
        Ok(roster)
    }

    pub fn emails(
        &mut self,
        source: &dyn EmailSource,
        window: SessionWindow,
    ) -> Result<Arc<Vec<EmailRecord>>, SourceError> {
        let key = SnapshotKey::new(source.id(), window);
        if let Some(hit) = self.emails.get(&key) {
            log::debug!("cache hit: {} ({})", key.source, key.window);
            return Ok(Arc::clone(hit));
        }
        let emails = Arc::new(source.fetch_emails(&window)?);
        self.emails.insert(key, Arc::clone(&emails));
        Ok(emails)
    }

    /// Drop one snapshot. Returns whether anything was cached under the key.
    pub fn invalidate(&mut self, key: &SnapshotKey) -> bool {
        let roster = self.rosters.remove(key).is_some();
        let emails = self.emails.remove(key).is_some();
        roster || emails
    }

    /// Drop every window cached for `source`.
    pub fn invalidate_source(&mut self, source: &str) {
        self.rosters.retain(|k, _| k.source != source);
        self.emails.retain(|k, _| k.source != source);
    }

    pub fn clear(&mut self) {
        self.rosters.clear();
        self.emails.clear();
    }

    pub fn len(&self) -> usize {
        self.rosters.len() + self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::Cell;

    struct CountingRoster {
        fetches: Cell<usize>,
        fail: bool,
    }

    impl RosterSource for CountingRoster {
        fn id(&self) -> String {
            "aca".into()
        }

        fn fetch_roster(&self) -> Result<ClassRoster, SourceError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail {
                return Err(SourceError::Timeout {
                    source: self.id(),
                    after_secs: 30,
                });
            }
            ClassRoster::from_pairs([("A", vec!["김빛나".to_string()])]).map_err(|error| {
                SourceError::Malformed {
                    source: self.id(),
                    error,
                }
            })
        }
    }

    struct CountingMailbox {
        fetches: Cell<usize>,
    }

    impl EmailSource for CountingMailbox {
        fn id(&self) -> String {
            "mailbox".into()
        }

        fn fetch_emails(&self, _window: &SessionWindow) -> Result<Vec<EmailRecord>, SourceError> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(vec![EmailRecord::default()])
        }
    }

    fn week(day: u32) -> SessionWindow {
        SessionWindow::last_days(NaiveDate::from_ymd_opt(2026, 10, day).unwrap(), 7)
    }

    #[test]
    fn second_fetch_is_served_from_cache() {
        let source = CountingRoster { fetches: Cell::new(0), fail: false };
        let mut cache = SnapshotCache::new();

        let a = cache.roster(&source).unwrap();
        let b = cache.roster(&source).unwrap();
        assert_eq!(source.fetches.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn roster_is_shared_across_windows() {
        let source = CountingRoster { fetches: Cell::new(0), fail: false };
        let mailbox = CountingMailbox { fetches: Cell::new(0) };
        let mut cache = SnapshotCache::new();

        for day in [10, 17] {
            cache.roster(&source).unwrap();
            cache.emails(&mailbox, week(day)).unwrap();
        }
        assert_eq!(source.fetches.get(), 1);
        assert_eq!(mailbox.fetches.get(), 2);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn windows_are_cached_separately() {
        let mailbox = CountingMailbox { fetches: Cell::new(0) };
        let mut cache = SnapshotCache::new();

        cache.emails(&mailbox, week(10)).unwrap();
        cache.emails(&mailbox, week(17)).unwrap();
        cache.emails(&mailbox, week(17)).unwrap();
        assert_eq!(mailbox.fetches.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let source = CountingRoster { fetches: Cell::new(0), fail: false };
        let mut cache = SnapshotCache::new();

        cache.roster(&source).unwrap();
        assert!(cache.invalidate(&SnapshotKey::roster("aca")));
        assert!(!cache.invalidate(&SnapshotKey::roster("aca")));
        cache.roster(&source).unwrap();
        assert_eq!(source.fetches.get(), 2);
    }

    #[test]
    fn invalidate_source_and_clear() {
        let source = CountingRoster { fetches: Cell::new(0), fail: false };
        let mailbox = CountingMailbox { fetches: Cell::new(0) };
        let mut cache = SnapshotCache::new();

        cache.roster(&source).unwrap();
        cache.emails(&mailbox, week(10)).unwrap();
        cache.emails(&mailbox, week(17)).unwrap();

        cache.invalidate_source("aca");
        assert_eq!(cache.len(), 2);
        cache.invalidate_source("mailbox");
        assert!(cache.is_empty());
        cache.roster(&source).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn failures_are_not_cached() {
        let source = CountingRoster { fetches: Cell::new(0), fail: true };
        let mut cache = SnapshotCache::new();

        assert!(cache.roster(&source).is_err());
        assert!(cache.roster(&source).is_err());
        assert_eq!(source.fetches.get(), 2);
        assert!(cache.is_empty());
    }
}
