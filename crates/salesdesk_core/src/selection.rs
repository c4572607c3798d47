use std::collections::BTreeSet;

use crate::record::{Record, RecordId};

/// Bulk-selection state.
///
/// Membership is independent of the current filter, sort and page. The
/// "all visible selected" flag is never stored; it is derived on read from
/// the filtered sequence the caller passes in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionTracker {
    ids: BTreeSet<RecordId>,
    bulk_mode: bool,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Replaces the selection with exactly the ids of `filtered`.
    pub fn select_all_visible(&mut self, filtered: &[&Record]) {
        self.ids = filtered.iter().map(|r| r.id.clone()).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn all_visible_selected(&self, filtered: &[&Record]) -> bool {
        !filtered.is_empty() && filtered.iter().all(|r| self.ids.contains(&r.id))
    }

    pub fn ids(&self) -> &BTreeSet<RecordId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn in_bulk_mode(&self) -> bool {
        self.bulk_mode
    }

    /// Starts bulk-select with an empty selection.
    pub fn enter_bulk_mode(&mut self) {
        self.bulk_mode = true;
        self.ids.clear();
    }

    pub fn exit_bulk_mode(&mut self) {
        self.bulk_mode = false;
        self.ids.clear();
    }

    /// Drops ids that are no longer present in `raw`. Returns how many went.
    pub fn retain_present(&mut self, raw: &[Record]) -> usize {
        let before = self.ids.len();
        let present: BTreeSet<&str> = raw.iter().map(|r| r.id.as_str()).collect();
        self.ids.retain(|id| present.contains(id.as_str()));
        before - self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SelectionTracker::new();
        assert!(selection.toggle("a"));
        assert!(selection.is_selected("a"));
        assert!(!selection.toggle("a"));
        assert!(!selection.is_selected("a"));
    }

    #[test]
    fn all_visible_selected_is_false_for_empty_view() {
        let mut selection = SelectionTracker::new();
        selection.toggle("a");
        assert!(!selection.all_visible_selected(&[]));
    }

    #[test]
    fn extra_selected_ids_do_not_block_all_visible() {
        let a = Record::new("a", "A");
        let mut selection = SelectionTracker::new();
        selection.toggle("a");
        selection.toggle("hidden");
        assert!(selection.all_visible_selected(&[&a]));
    }

    #[test]
    fn bulk_mode_transitions_reset_selection() {
        let mut selection = SelectionTracker::new();
        selection.toggle("stale");
        selection.enter_bulk_mode();
        assert!(selection.in_bulk_mode());
        assert!(selection.is_empty());

        selection.toggle("a");
        selection.exit_bulk_mode();
        assert!(!selection.in_bulk_mode());
        assert!(selection.is_empty());
    }

    #[test]
    fn retain_present_drops_vanished_ids() {
        let raw = vec![Record::new("a", "A"), Record::new("b", "B")];
        let mut selection = SelectionTracker::new();
        selection.toggle("a");
        selection.toggle("gone");
        assert_eq!(selection.retain_present(&raw), 1);
        assert!(selection.is_selected("a"));
        assert!(!selection.is_selected("gone"));
    }
}
