use std::collections::HashSet;

use desk_logging::{desk_debug, desk_warn};

use crate::record::Record;
use crate::remote::FetchHints;

/// Sequence stamp handed out when a snapshot fetch is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The snapshot replaced the previous one.
    Applied { version: u64 },
    /// A newer fetch has been issued since; the result was dropped.
    Stale { latest: FetchTicket },
}

/// Versioned holder of the one raw record snapshot in effect.
///
/// Only the result of the most recently issued fetch may replace the
/// snapshot, whatever order the fetches resolve in. The store remembers the
/// server-side hints each snapshot was narrowed by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    version: u64,
    issued: u64,
    settled: u64,
    hints: FetchHints,
    pending_hints: FetchHints,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Bumped every time the snapshot is replaced or cleared.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// True while the latest issued fetch has not resolved.
    pub fn is_pending(&self) -> bool {
        self.settled < self.issued
    }

    /// Issues an unnarrowed fetch.
    pub fn issue(&mut self) -> FetchTicket {
        self.issue_hinted(FetchHints::default())
    }

    pub fn issue_hinted(&mut self, hints: FetchHints) -> FetchTicket {
        self.issued += 1;
        self.pending_hints = hints;
        desk_debug!("Issued record fetch #{}", self.issued);
        FetchTicket(self.issued)
    }

    /// Hints of the outstanding fetch if one is pending, otherwise those the
    /// current snapshot was fetched with.
    pub fn hints(&self) -> &FetchHints {
        if self.is_pending() {
            &self.pending_hints
        } else {
            &self.hints
        }
    }

    pub fn latest_ticket(&self) -> Option<FetchTicket> {
        (self.issued > 0).then_some(FetchTicket(self.issued))
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued && self.settled < ticket.0
    }

    /// Applies `records` if `ticket` is the latest issued fetch and has not
    /// settled yet. Duplicate ids keep their first occurrence.
    pub fn resolve(&mut self, ticket: FetchTicket, records: Vec<Record>) -> Resolution {
        if !self.is_current(ticket) {
            desk_debug!(
                "Dropping stale record fetch #{} (latest #{})",
                ticket.0,
                self.issued
            );
            return Resolution::Stale {
                latest: FetchTicket(self.issued),
            };
        }

        let received = records.len();
        let mut seen = HashSet::with_capacity(received);
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        if records.len() != received {
            desk_warn!(
                "Record fetch #{} contained {} duplicate ids",
                ticket.0,
                received - records.len()
            );
        }

        self.records = records;
        self.hints = std::mem::take(&mut self.pending_hints);
        self.settled = ticket.0;
        self.version += 1;
        Resolution::Applied {
            version: self.version,
        }
    }

    /// Marks a failed fetch as settled without touching the snapshot.
    /// Returns false when the failure belongs to a superseded fetch.
    pub fn reject(&mut self, ticket: FetchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.settled = ticket.0;
        true
    }

    /// Drops the snapshot. Outstanding fetches are superseded.
    pub fn clear(&mut self) {
        self.records.clear();
        self.hints = FetchHints::default();
        self.settled = self.issued;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[&str]) -> Vec<Record> {
        ids.iter().map(|id| Record::new(*id, *id)).collect()
    }

    #[test]
    fn latest_issued_fetch_wins_regardless_of_resolution_order() {
        let mut store = RecordStore::new();
        let a = store.issue();
        let b = store.issue();

        assert_eq!(store.resolve(b, batch(&["b"])), Resolution::Applied { version: 1 });
        assert_eq!(store.resolve(a, batch(&["a"])), Resolution::Stale { latest: b });
        assert_eq!(store.records()[0].id, "b");
        assert!(!store.is_pending());
    }

    #[test]
    fn earlier_fetch_resolving_first_is_still_stale() {
        let mut store = RecordStore::new();
        let a = store.issue();
        let b = store.issue();

        assert!(matches!(store.resolve(a, batch(&["a"])), Resolution::Stale { .. }));
        assert!(store.records().is_empty());
        assert!(store.is_pending());
        assert!(matches!(store.resolve(b, batch(&["b"])), Resolution::Applied { .. }));
    }

    #[test]
    fn a_ticket_settles_only_once() {
        let mut store = RecordStore::new();
        let a = store.issue();
        store.resolve(a, batch(&["a"]));
        assert!(matches!(store.resolve(a, batch(&["x"])), Resolution::Stale { .. }));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn rejection_keeps_last_good_snapshot() {
        let mut store = RecordStore::new();
        let a = store.issue();
        store.resolve(a, batch(&["a", "b"]));

        let b = store.issue();
        assert!(store.is_pending());
        assert!(store.reject(b));
        assert!(!store.is_pending());
        assert_eq!(store.records().len(), 2);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut store = RecordStore::new();
        let t = store.issue();
        let mut records = batch(&["a", "b"]);
        records.push(Record::new("a", "second a"));
        store.resolve(t, records);
        assert_eq!(store.records().len(), 2);
        assert_eq!(store.get("a").unwrap().name, "a");
    }

    #[test]
    fn hints_follow_the_applied_snapshot() {
        let mut store = RecordStore::new();
        let narrowed = FetchHints {
            query: Some("acme".into()),
            ..FetchHints::default()
        };
        let a = store.issue_hinted(narrowed.clone());
        assert_eq!(store.hints(), &narrowed);
        store.resolve(a, batch(&["a"]));
        assert_eq!(store.hints(), &narrowed);

        let b = store.issue();
        assert_eq!(store.hints(), &FetchHints::default());
        assert!(store.reject(b));
        assert_eq!(store.hints(), &narrowed);

        store.clear();
        assert_eq!(store.hints(), &FetchHints::default());
    }
}
