use crate::call::OutcomeDraft;
use crate::clock::Moment;
use crate::filter::{CategoryField, Segment};
use crate::record::{Record, RecordId};
use crate::remote::{MutationAction, MutationSummary, RemoteFailure, UserOption};
use crate::sort::SortSpec;
use crate::state::PanelMode;
use crate::store::FetchTicket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator asked for a fresh snapshot.
    RefreshRequested,
    /// Data layer finished a snapshot fetch.
    RecordsFetched {
        ticket: FetchTicket,
        result: Result<Vec<Record>, RemoteFailure>,
    },
    /// Search box edited.
    QueryChanged { query: String, at: Moment },
    /// Periodic clock tick; fires due debounced lookups.
    Tick { at: Moment },
    CategoryChanged {
        field: CategoryField,
        value: Option<String>,
    },
    SegmentChanged(Segment),
    SortChanged(SortSpec),
    PageSizeChanged(usize),
    ShowMore,
    BulkModeEntered,
    BulkModeExited,
    SelectionToggled(RecordId),
    /// Header checkbox clicked.
    SelectAllToggled,
    /// Apply an action to the current selection.
    BulkActionRequested(MutationAction),
    /// Apply an action to one record.
    RecordActionRequested {
        id: RecordId,
        action: MutationAction,
    },
    MutationCompleted {
        result: Result<MutationSummary, RemoteFailure>,
    },
    RecordOpened { id: RecordId, mode: PanelMode },
    DetailClosed,
    /// Open the assign modal for `ids`, or for the selection when `None`.
    AssignOpened { ids: Option<Vec<RecordId>> },
    UsersFetched {
        result: Result<Vec<UserOption>, RemoteFailure>,
    },
    AssignQueryChanged(String),
    AssignConfirmed { owner_id: String },
    AssignClosed,
    CallStarted {
        id: RecordId,
        call_log_id: Option<String>,
        at: Moment,
    },
    CallEnded { at: Moment },
    OutcomeMinimized { at: Moment },
    OutcomeReopened { at: Moment },
    OutcomeDiscarded,
    OutcomeSubmitted { draft: OutcomeDraft, at: Moment },
    OutcomeSaveCompleted {
        result: Result<(), RemoteFailure>,
    },
    NoticeDismissed(usize),
    /// Blank input line; changes nothing.
    NoOp,
}
