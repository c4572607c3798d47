use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Work-queue urgency: overdue, due today, scheduled, then the rest.
    #[default]
    Priority,
    Name,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Compares two records by the sort key only. Equal keys yield
    /// `Ordering::Equal`; there is no secondary key.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match self.key {
            SortKey::Priority => a.queue.priority().cmp(&b.queue.priority()),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Status => status_key(a).cmp(&status_key(b)),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// Sorts in place. `sort_by` is stable, so ties keep their input order
    /// in both directions.
    pub fn apply(&self, records: &mut [&Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

/// Canonical spelling when the status is recognised, so legacy spellings
/// group with their canonical status; otherwise the case-folded raw value.
fn status_key(record: &Record) -> String {
    match record.canonical_status() {
        Some(status) => status.as_str().to_string(),
        None => record.status.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::QueueMarker;

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn priority_orders_by_queue_rank() {
        let a = Record::new("a", "A");
        let b = Record::new("b", "B").with_queue(QueueMarker::Scheduled);
        let c = Record::new("c", "C").with_queue(QueueMarker::Overdue);
        let d = Record::new("d", "D").with_queue(QueueMarker::DueToday);
        let mut refs = vec![&a, &b, &c, &d];

        SortSpec::default().apply(&mut refs);
        assert_eq!(ids(&refs), vec!["c", "d", "b", "a"]);
    }

    #[test]
    fn descending_keeps_ties_in_input_order() {
        let a = Record::new("a", "Same").with_queue(QueueMarker::Overdue);
        let b = Record::new("b", "Same").with_queue(QueueMarker::Overdue);
        let c = Record::new("c", "Other");
        let mut refs = vec![&a, &b, &c];

        SortSpec::new(SortKey::Priority, SortDirection::Descending).apply(&mut refs);
        assert_eq!(ids(&refs), vec!["c", "a", "b"]);
    }

    #[test]
    fn name_comparison_is_case_folded() {
        let a = Record::new("a", "beta");
        let b = Record::new("b", "Alpha");
        let c = Record::new("c", "ALPHA");
        let mut refs = vec![&a, &b, &c];

        SortSpec::new(SortKey::Name, SortDirection::Ascending).apply(&mut refs);
        assert_eq!(ids(&refs), vec!["b", "c", "a"]);
    }

    #[test]
    fn legacy_status_spellings_sort_with_canonical_status() {
        let a = Record::new("a", "A").with_status("won");
        let b = Record::new("b", "B").with_status("New");
        let c = Record::new("c", "C").with_status("Closed Won");
        let d = Record::new("d", "D").with_status("won");
        let mut refs = vec![&a, &b, &c, &d];

        SortSpec::new(SortKey::Status, SortDirection::Ascending).apply(&mut refs);
        assert_eq!(ids(&refs), vec!["b", "a", "c", "d"]);
    }
}
