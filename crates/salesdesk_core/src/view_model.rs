use crate::call::CallPhase;
use crate::filter::{CategoryField, FilterSpec};
use crate::record::{QueueMarker, Record, RecordId};
use crate::remote::UserOption;
use crate::sort::SortSpec;
use crate::state::{Notice, PanelMode};
use crate::view::SegmentCount;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub snapshot_version: u64,
    /// A snapshot fetch is outstanding.
    pub loading: bool,
    /// A mutation or the refresh following it is outstanding.
    pub busy: bool,
    pub session_expired: bool,
    pub total_records: usize,
    pub filtered_count: usize,
    pub rows: Vec<RecordRowView>,
    pub has_more: bool,
    pub page_size: usize,
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub segment_counts: Vec<SegmentCount>,
    pub facets: Vec<FacetView>,
    pub selection: SelectionView,
    pub detail: Option<DetailView>,
    pub assign: Option<AssignView>,
    pub call: CallView,
    pub notices: Vec<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRowView {
    pub id: RecordId,
    pub name: String,
    pub company: Option<String>,
    pub status: String,
    pub owner: Option<String>,
    pub queue: QueueMarker,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetView {
    pub field: CategoryField,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionView {
    pub bulk_mode: bool,
    pub ids: Vec<RecordId>,
    pub all_visible_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub record: Record,
    pub mode: PanelMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignView {
    pub target_count: usize,
    pub query: String,
    pub users: Vec<UserOption>,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSessionView {
    pub record_id: RecordId,
    pub display_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallView {
    pub phase: CallPhase,
    pub session: Option<CallSessionView>,
    pub elapsed_secs: u64,
    pub outcome_visible: bool,
    pub saving: bool,
}
