use std::collections::BTreeSet;

use crate::filter::{CategoryField, FilterSpec, Segment};
use crate::paginate::paginate;
use crate::record::Record;
use crate::sort::SortSpec;

/// Result of one pass of the view pipeline over a snapshot.
///
/// `filtered` is the full filtered and sorted sequence (the bulk-selection
/// scope); `paged` is its prefix of at most `page_size` records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView<'a> {
    filtered: Vec<&'a Record>,
    page_len: usize,
}

impl<'a> RecordView<'a> {
    pub fn filtered(&self) -> &[&'a Record] {
        &self.filtered
    }

    pub fn paged(&self) -> &[&'a Record] {
        &self.filtered[..self.page_len]
    }

    pub fn has_more(&self) -> bool {
        self.page_len < self.filtered.len()
    }
}

/// Filter, then stable-sort, then prefix-truncate. Every stage reruns on
/// every call.
pub fn compute_view<'a>(
    raw: &'a [Record],
    filter: &FilterSpec,
    sort: &SortSpec,
    page_size: usize,
) -> RecordView<'a> {
    let mut filtered: Vec<&'a Record> = raw.iter().filter(|r| filter.matches(r)).collect();
    sort.apply(&mut filtered);
    let page_len = paginate(&filtered, page_size).len();
    RecordView { filtered, page_len }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCount {
    pub segment: Segment,
    pub count: usize,
}

/// Size of every segment over the whole snapshot, ignoring other filters.
pub fn segment_counts(raw: &[Record]) -> Vec<SegmentCount> {
    Segment::catalogue()
        .into_iter()
        .map(|segment| SegmentCount {
            segment,
            count: raw.iter().filter(|r| segment.matches(r)).count(),
        })
        .collect()
}

/// Distinct non-empty values of a categorical field, sorted.
pub fn facet_values(raw: &[Record], field: CategoryField) -> Vec<String> {
    raw.iter()
        .filter_map(|r| field.value_of(r))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect()
}
