use std::collections::VecDeque;
use std::time::{Duration, Instant};

use desk_logging::{desk_error, desk_info, desk_warn};

use crate::call::CallState;
use crate::clock::Moment;
use crate::filter::{CategoryField, FilterSpec};
use crate::paginate::Paginator;
use crate::record::RecordId;
use crate::remote::UserOption;
use crate::selection::SelectionTracker;
use crate::sort::SortSpec;
use crate::store::{FetchTicket, RecordStore};
use crate::view::{compute_view, facet_values, segment_counts};
use crate::view_model::{
    AppViewModel, AssignView, CallSessionView, CallView, DetailView, FacetView, RecordRowView,
    SelectionView,
};

/// Most recent notices kept for display.
pub const MAX_NOTICES: usize = 5;

/// Tunables for the record view and search behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub page_size: usize,
    pub page_step: usize,
    pub search_debounce: Duration,
    pub min_search_len: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            page_size: 25,
            page_step: 25,
            search_debounce: Duration::from_millis(300),
            min_search_len: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelMode {
    Popup,
    Split,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanel {
    pub record_id: RecordId,
    pub mode: PanelMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignModal {
    pub target_ids: Vec<RecordId>,
    pub query: String,
    pub users: Vec<UserOption>,
    pub loading: bool,
}

impl AssignModal {
    pub(crate) fn new(target_ids: Vec<RecordId>) -> Self {
        Self {
            target_ids,
            query: String::new(),
            users: Vec::new(),
            loading: true,
        }
    }

    /// Users whose name contains the modal's search query.
    pub fn visible_users(&self) -> Vec<&UserOption> {
        let needle = self.query.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| needle.is_empty() || u.name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Progress of the one mutation allowed at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum MutationPhase {
    #[default]
    Idle,
    InFlight { label: &'static str },
    /// The mutation succeeded; waiting for the snapshot fetched after it.
    Refreshing { after: FetchTicket },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) settings: ViewSettings,
    pub(crate) store: RecordStore,
    pub(crate) filter: FilterSpec,
    pub(crate) sort: SortSpec,
    pub(crate) pager: Paginator,
    pub(crate) selection: SelectionTracker,
    pub(crate) call: CallState,
    pub(crate) detail: Option<DetailPanel>,
    pub(crate) assign: Option<AssignModal>,
    pub(crate) lookup_due: Option<Instant>,
    pub(crate) mutation: MutationPhase,
    pub(crate) notices: VecDeque<Notice>,
    pub(crate) session_expired: bool,
    pub(crate) clock: Option<Instant>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(ViewSettings::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ViewSettings) -> Self {
        Self {
            settings,
            store: RecordStore::new(),
            filter: FilterSpec::default(),
            sort: SortSpec::default(),
            pager: Paginator::new(settings.page_size, settings.page_step),
            selection: SelectionTracker::new(),
            call: CallState::default(),
            detail: None,
            assign: None,
            lookup_due: None,
            mutation: MutationPhase::Idle,
            notices: VecDeque::new(),
            session_expired: false,
            clock: None,
            dirty: false,
        }
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn call(&self) -> &CallState {
        &self.call
    }

    pub fn is_busy(&self) -> bool {
        self.mutation != MutationPhase::Idle
    }

    /// True while a debounced search lookup is scheduled.
    pub fn lookup_pending(&self) -> bool {
        self.lookup_due.is_some()
    }

    /// Returns whether anything changed since the last call, and resets it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Advances the state's notion of "now". Time never moves backwards.
    pub(crate) fn observe(&mut self, at: Moment) {
        if self.clock.map_or(true, |seen| at.mono > seen) {
            self.clock = Some(at.mono);
        }
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Info => desk_info!("{}", message),
            NoticeLevel::Warning => desk_warn!("{}", message),
            NoticeLevel::Error => desk_error!("{}", message),
        }
        self.notices.push_back(Notice { level, message });
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
        self.dirty = true;
    }

    pub fn view(&self) -> AppViewModel {
        let raw = self.store.records();
        let view = compute_view(raw, &self.filter, &self.sort, self.pager.page_size());

        let rows = view
            .paged()
            .iter()
            .map(|r| RecordRowView {
                id: r.id.clone(),
                name: r.name.clone(),
                company: r.company.clone(),
                status: r.status.clone(),
                owner: r.owner.clone(),
                queue: r.queue,
                selected: self.selection.is_selected(&r.id),
            })
            .collect();

        let facets = CategoryField::ALL
            .iter()
            .map(|&field| FacetView {
                field,
                values: facet_values(raw, field),
            })
            .collect();

        let detail = self.detail.as_ref().and_then(|panel| {
            self.store.get(&panel.record_id).map(|record| DetailView {
                record: record.clone(),
                mode: panel.mode,
            })
        });

        let assign = self.assign.as_ref().map(|modal| AssignView {
            target_count: modal.target_ids.len(),
            query: modal.query.clone(),
            users: modal.visible_users().into_iter().cloned().collect(),
            loading: modal.loading,
        });

        let call = CallView {
            phase: self.call.phase(),
            session: self.call.session().map(|s| CallSessionView {
                record_id: s.record_id.clone(),
                display_name: s.display_name.clone(),
                phone: s.phone.clone(),
            }),
            elapsed_secs: self.clock.map_or(0, |now| self.call.elapsed_secs(now)),
            outcome_visible: self.call.outcome_visible(),
            saving: self.call.is_saving(),
        };

        AppViewModel {
            snapshot_version: self.store.version(),
            loading: self.store.is_pending(),
            busy: self.is_busy(),
            session_expired: self.session_expired,
            total_records: raw.len(),
            filtered_count: view.filtered().len(),
            rows,
            has_more: view.has_more(),
            page_size: self.pager.page_size(),
            filter: self.filter.clone(),
            sort: self.sort,
            segment_counts: segment_counts(raw),
            facets,
            selection: SelectionView {
                bulk_mode: self.selection.in_bulk_mode(),
                ids: self.selection.ids().iter().cloned().collect(),
                all_visible_selected: self.selection.all_visible_selected(view.filtered()),
            },
            detail,
            assign,
            call,
            notices: self.notices.iter().cloned().collect(),
            dirty: self.dirty,
        }
    }
}
