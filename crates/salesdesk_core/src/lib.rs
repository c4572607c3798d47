//! Salesdesk core: record view pipeline, bulk selection, call lifecycle, and
//! the pure update function that ties them together.
mod call;
mod clock;
mod effect;
mod filter;
mod msg;
mod paginate;
mod record;
mod remote;
mod selection;
mod sort;
mod state;
mod store;
mod update;
mod view;
mod view_model;

pub use call::{
    CallError, CallOutcomeRecord, CallPhase, CallSession, CallState, CallTarget, OutcomeDraft,
};
pub use clock::Moment;
pub use effect::Effect;
pub use filter::{CategoryField, FilterSpec, Segment};
pub use msg::Msg;
pub use paginate::{paginate, Paginator};
pub use record::{QueueMarker, Record, RecordId, RecordKind, Status};
pub use remote::{
    FetchHints, MutationAction, MutationRequest, MutationSummary, RemoteFailure,
    RemoteFailureKind, UserOption,
};
pub use selection::SelectionTracker;
pub use sort::{SortDirection, SortKey, SortSpec};
pub use state::{
    AppState, AssignModal, DetailPanel, Notice, NoticeLevel, PanelMode, ViewSettings, MAX_NOTICES,
};
pub use store::{FetchTicket, RecordStore, Resolution};
pub use update::update;
pub use view::{compute_view, facet_values, segment_counts, RecordView, SegmentCount};
pub use view_model::{
    AppViewModel, AssignView, CallSessionView, CallView, DetailView, FacetView, RecordRowView,
    SelectionView,
};
