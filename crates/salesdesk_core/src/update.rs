use std::time::Instant;

use desk_logging::{desk_debug, desk_info, desk_warn};

use crate::call::{CallTarget, OutcomeDraft};
use crate::clock::Moment;
use crate::record::{Record, RecordId};
use crate::remote::{
    FetchHints, MutationAction, MutationRequest, MutationSummary, RemoteFailure,
    RemoteFailureKind, UserOption,
};
use crate::state::{AssignModal, DetailPanel, MutationPhase, NoticeLevel};
use crate::store::{FetchTicket, Resolution};
use crate::view::compute_view;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => vec![issue_fetch(&mut state)],
        Msg::RecordsFetched { ticket, result } => apply_fetch(&mut state, ticket, result),
        Msg::QueryChanged { query, at } => {
            state.observe(at);
            change_query(&mut state, query, at.mono);
            widen_snapshot(&mut state).into_iter().collect()
        }
        Msg::Tick { at } => {
            state.observe(at);
            if state.call.session().is_some() {
                state.mark_dirty();
            }
            fire_due_lookup(&mut state, at.mono).into_iter().collect()
        }
        Msg::CategoryChanged { field, value } => {
            state.filter.set_category(field, value);
            state.mark_dirty();
            widen_snapshot(&mut state).into_iter().collect()
        }
        Msg::SegmentChanged(segment) => {
            state.filter.segment = segment;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SortChanged(sort) => {
            state.sort = sort;
            state.mark_dirty();
            Vec::new()
        }
        Msg::PageSizeChanged(page_size) => {
            state.pager.set_page_size(page_size);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ShowMore => {
            state.pager.show_more();
            state.mark_dirty();
            Vec::new()
        }
        Msg::BulkModeEntered => {
            state.selection.enter_bulk_mode();
            state.mark_dirty();
            Vec::new()
        }
        Msg::BulkModeExited => {
            state.selection.exit_bulk_mode();
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectionToggled(id) => {
            toggle_selection(&mut state, &id);
            Vec::new()
        }
        Msg::SelectAllToggled => {
            toggle_select_all(&mut state);
            Vec::new()
        }
        Msg::BulkActionRequested(action) => request_bulk_action(&mut state, action),
        Msg::RecordActionRequested { id, action } => {
            if !state.store.contains(&id) {
                state.notify(NoticeLevel::Warning, format!("Record {id} is no longer listed"));
                return (state, Vec::new());
            }
            start_mutation(&mut state, action, vec![id])
        }
        Msg::MutationCompleted { result } => complete_mutation(&mut state, result),
        Msg::RecordOpened { id, mode } => {
            if state.store.contains(&id) {
                state.detail = Some(DetailPanel { record_id: id, mode });
                state.mark_dirty();
            } else {
                desk_debug!("Ignoring open of unknown record {}", id);
            }
            Vec::new()
        }
        Msg::DetailClosed => {
            if state.detail.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AssignOpened { ids } => open_assign(&mut state, ids),
        Msg::UsersFetched { result } => apply_users(&mut state, result),
        Msg::AssignQueryChanged(query) => {
            if let Some(modal) = state.assign.as_mut() {
                modal.query = query;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AssignConfirmed { owner_id } => confirm_assign(&mut state, owner_id),
        Msg::AssignClosed => {
            if state.assign.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CallStarted {
            id,
            call_log_id,
            at,
        } => {
            state.observe(at);
            start_call(&mut state, &id, call_log_id, at);
            Vec::new()
        }
        Msg::CallEnded { at } => {
            state.observe(at);
            let result = state.call.end();
            report_call_result(&mut state, result);
            Vec::new()
        }
        Msg::OutcomeMinimized { at } => {
            state.observe(at);
            let result = state.call.minimize();
            report_call_result(&mut state, result);
            Vec::new()
        }
        Msg::OutcomeReopened { at } => {
            state.observe(at);
            let result = state.call.reopen();
            report_call_result(&mut state, result);
            Vec::new()
        }
        Msg::OutcomeDiscarded => {
            match state.call.discard() {
                Ok(session) => {
                    desk_info!("Discarded call with record {}", session.record_id);
                    state.mark_dirty();
                }
                Err(err) => state.notify(NoticeLevel::Warning, err.to_string()),
            }
            Vec::new()
        }
        Msg::OutcomeSubmitted { draft, at } => submit_outcome(&mut state, &draft, at),
        Msg::OutcomeSaveCompleted { result } => complete_outcome_save(&mut state, result),
        Msg::NoticeDismissed(index) => {
            if index < state.notices.len() {
                state.notices.remove(index);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn current_hints(state: &AppState) -> FetchHints {
    FetchHints::from_filter(&state.filter, state.settings.min_search_len)
}

fn issue_fetch(state: &mut AppState) -> Effect {
    let hints = current_hints(state);
    let ticket = state.store.issue_hinted(hints.clone());
    // The fetch carries the current query as a hint, so a pending lookup is redundant.
    state.lookup_due = None;
    state.mark_dirty();
    Effect::FetchRecords { ticket, hints }
}

/// Refetches at once when the filter got looser than the hints the snapshot
/// was narrowed by; the narrowed snapshot would hide matching records.
fn widen_snapshot(state: &mut AppState) -> Option<Effect> {
    if state.store.hints().covers(&current_hints(state)) {
        return None;
    }
    desk_debug!("Filter widened past snapshot hints; refetching");
    Some(issue_fetch(state))
}

fn apply_fetch(
    state: &mut AppState,
    ticket: FetchTicket,
    result: Result<Vec<Record>, RemoteFailure>,
) -> Vec<Effect> {
    match result {
        Ok(records) => {
            let Resolution::Applied { version } = state.store.resolve(ticket, records) else {
                return Vec::new();
            };
            desk_info!(
                "Applied snapshot v{} from fetch #{} ({} records)",
                version,
                ticket.seq(),
                state.store.records().len()
            );
            state.session_expired = false;
            prune_vanished(state);
            settle_refresh(state);
            state.mark_dirty();
            Vec::new()
        }
        Err(failure) => {
            if !state.store.reject(ticket) {
                desk_debug!("Ignoring failure of superseded fetch #{}", ticket.seq());
                return Vec::new();
            }
            settle_refresh(state);
            match failure.kind {
                RemoteFailureKind::Unauthorized => expire_session(state, &failure),
                RemoteFailureKind::Unavailable => {
                    state.notify(
                        NoticeLevel::Warning,
                        format!("Could not refresh records: {failure}"),
                    );
                    Vec::new()
                }
            }
        }
    }
}

/// Drops selection, detail and assign targets that left the snapshot.
fn prune_vanished(state: &mut AppState) {
    let dropped = state.selection.retain_present(state.store.records());
    if dropped > 0 {
        desk_debug!("Dropped {} vanished ids from the selection", dropped);
    }

    if let Some(panel) = &state.detail {
        if !state.store.contains(&panel.record_id) {
            desk_debug!("Closing detail panel for vanished record {}", panel.record_id);
            state.detail = None;
        }
    }

    if let Some(modal) = state.assign.as_mut() {
        let store = &state.store;
        modal.target_ids.retain(|id| store.contains(id));
        if modal.target_ids.is_empty() {
            state.assign = None;
        }
    }
}

fn settle_refresh(state: &mut AppState) {
    if let MutationPhase::Refreshing { after } = state.mutation {
        if state.store.latest_ticket() >= Some(after) && !state.store.is_pending() {
            state.mutation = MutationPhase::Idle;
        }
    }
}

fn expire_session(state: &mut AppState, failure: &RemoteFailure) -> Vec<Effect> {
    desk_warn!("Session expired: {}", failure);
    state.store.clear();
    state.selection.clear();
    state.detail = None;
    state.assign = None;
    state.lookup_due = None;
    state.mutation = MutationPhase::Idle;
    state.session_expired = true;
    state.notify(NoticeLevel::Error, "Session expired, sign in again");
    vec![Effect::RequireLogin]
}

fn change_query(state: &mut AppState, query: String, now: Instant) {
    let long_enough = query.trim().chars().count() >= state.settings.min_search_len;
    state.filter.query = query;
    state.lookup_due = long_enough.then(|| now + state.settings.search_debounce);
    state.mark_dirty();
}

fn fire_due_lookup(state: &mut AppState, now: Instant) -> Option<Effect> {
    let due = state.lookup_due?;
    if now < due {
        return None;
    }
    desk_debug!("Search debounce elapsed for {:?}", state.filter.query);
    Some(issue_fetch(state))
}

fn toggle_selection(state: &mut AppState, id: &str) {
    if !state.selection.in_bulk_mode() {
        desk_debug!("Ignoring selection toggle outside bulk mode");
        return;
    }
    if !state.store.contains(id) {
        desk_debug!("Ignoring selection toggle for unknown record {}", id);
        return;
    }
    state.selection.toggle(id);
    state.mark_dirty();
}

fn toggle_select_all(state: &mut AppState) {
    if !state.selection.in_bulk_mode() {
        return;
    }
    let view = compute_view(
        state.store.records(),
        &state.filter,
        &state.sort,
        state.pager.page_size(),
    );
    if state.selection.all_visible_selected(view.filtered()) {
        state.selection.clear();
    } else {
        state.selection.select_all_visible(view.filtered());
    }
    state.mark_dirty();
}

fn request_bulk_action(state: &mut AppState, action: MutationAction) -> Vec<Effect> {
    if !state.selection.in_bulk_mode() || state.selection.is_empty() {
        state.notify(NoticeLevel::Warning, "Select at least one record first");
        return Vec::new();
    }
    let ids = state.selection.ids().iter().cloned().collect();
    start_mutation(state, action, ids)
}

fn refuse_if_busy(state: &mut AppState) -> bool {
    if state.is_busy() {
        state.notify(
            NoticeLevel::Warning,
            "Another change is still being applied, try again shortly",
        );
        return true;
    }
    false
}

fn start_mutation(state: &mut AppState, action: MutationAction, ids: Vec<RecordId>) -> Vec<Effect> {
    if refuse_if_busy(state) {
        return Vec::new();
    }
    let label = action.label();
    desk_info!("Requesting {} for {} records", label, ids.len());
    state.mutation = MutationPhase::InFlight { label };
    state.mark_dirty();
    vec![Effect::Mutate(MutationRequest { action, ids })]
}

fn complete_mutation(
    state: &mut AppState,
    result: Result<MutationSummary, RemoteFailure>,
) -> Vec<Effect> {
    let MutationPhase::InFlight { label } = state.mutation else {
        desk_debug!("Ignoring mutation completion with nothing in flight");
        return Vec::new();
    };

    match result {
        Ok(summary) if summary.success => {
            state.notify(
                NoticeLevel::Info,
                format!("{} applied to {} records", capitalize(label), summary.count),
            );
            state.selection.clear();
            let fetch = issue_fetch(state);
            if let Effect::FetchRecords { ticket, .. } = &fetch {
                state.mutation = MutationPhase::Refreshing { after: *ticket };
            }
            vec![fetch]
        }
        Ok(_) => {
            state.mutation = MutationPhase::Idle;
            state.notify(NoticeLevel::Warning, format!("The {label} was not applied"));
            Vec::new()
        }
        Err(failure) => {
            state.mutation = MutationPhase::Idle;
            match failure.kind {
                RemoteFailureKind::Unauthorized => expire_session(state, &failure),
                RemoteFailureKind::Unavailable => {
                    state.notify(
                        NoticeLevel::Error,
                        format!("{} failed: {failure}", capitalize(label)),
                    );
                    Vec::new()
                }
            }
        }
    }
}

fn open_assign(state: &mut AppState, ids: Option<Vec<RecordId>>) -> Vec<Effect> {
    let requested = ids.unwrap_or_else(|| state.selection.ids().iter().cloned().collect());
    let targets: Vec<RecordId> = requested
        .into_iter()
        .filter(|id| state.store.contains(id))
        .collect();
    if targets.is_empty() {
        state.notify(NoticeLevel::Warning, "Select at least one record first");
        return Vec::new();
    }
    if refuse_if_busy(state) {
        return Vec::new();
    }
    state.assign = Some(AssignModal::new(targets));
    state.mark_dirty();
    vec![Effect::FetchUsers]
}

fn apply_users(state: &mut AppState, result: Result<Vec<UserOption>, RemoteFailure>) -> Vec<Effect> {
    let Some(modal) = state.assign.as_mut() else {
        desk_debug!("Users arrived after the assign modal closed");
        return Vec::new();
    };
    modal.loading = false;
    match result {
        Ok(users) => {
            modal.users = users;
            state.mark_dirty();
            Vec::new()
        }
        Err(failure) => match failure.kind {
            RemoteFailureKind::Unauthorized => expire_session(state, &failure),
            RemoteFailureKind::Unavailable => {
                state.notify(NoticeLevel::Warning, format!("Could not load users: {failure}"));
                Vec::new()
            }
        },
    }
}

fn confirm_assign(state: &mut AppState, owner_id: String) -> Vec<Effect> {
    let Some(modal) = state.assign.as_ref() else {
        return Vec::new();
    };
    let owner_id = owner_id.trim().to_string();
    let known = modal.users.iter().any(|u| u.id == owner_id);
    if owner_id.is_empty() || (!modal.loading && !known) {
        state.notify(NoticeLevel::Warning, "Choose a user to assign to");
        return Vec::new();
    }
    if refuse_if_busy(state) {
        return Vec::new();
    }
    let Some(modal) = state.assign.take() else {
        return Vec::new();
    };
    start_mutation(
        state,
        MutationAction::Assign { owner_id },
        modal.target_ids,
    )
}

fn start_call(state: &mut AppState, id: &str, call_log_id: Option<String>, at: Moment) {
    let Some(record) = state.store.get(id) else {
        state.notify(NoticeLevel::Warning, format!("Record {id} is no longer listed"));
        return;
    };
    let target = CallTarget {
        record_id: record.id.clone(),
        display_name: record.name.clone(),
        phone: record.phone.clone().unwrap_or_default(),
        call_log_id,
    };
    match state.call.start(target, at) {
        Ok(()) => {
            desk_info!("Call started with record {}", id);
            state.mark_dirty();
        }
        Err(err) => state.notify(NoticeLevel::Warning, err.to_string()),
    }
}

fn report_call_result(state: &mut AppState, result: Result<(), crate::CallError>) {
    match result {
        Ok(()) => state.mark_dirty(),
        Err(err) => state.notify(NoticeLevel::Warning, err.to_string()),
    }
}

fn submit_outcome(state: &mut AppState, draft: &OutcomeDraft, at: Moment) -> Vec<Effect> {
    state.observe(at);
    match state.call.begin_save(draft, at) {
        Ok(record) => {
            desk_info!(
                "Saving call outcome for {} ({}s)",
                record.record_id,
                record.duration_secs
            );
            state.mark_dirty();
            vec![Effect::SaveCallOutcome(record)]
        }
        Err(err) => {
            state.notify(NoticeLevel::Warning, err.to_string());
            Vec::new()
        }
    }
}

fn complete_outcome_save(state: &mut AppState, result: Result<(), RemoteFailure>) -> Vec<Effect> {
    match result {
        Ok(()) => match state.call.save_succeeded() {
            Ok(session) => {
                state.notify(
                    NoticeLevel::Info,
                    format!("Call with {} logged", session.display_name),
                );
                vec![issue_fetch(state)]
            }
            Err(err) => {
                desk_debug!("Ignoring outcome save completion: {}", err);
                Vec::new()
            }
        },
        Err(failure) => {
            if let Err(err) = state.call.save_failed() {
                desk_debug!("Ignoring outcome save failure: {}", err);
                return Vec::new();
            }
            match failure.kind {
                RemoteFailureKind::Unauthorized => expire_session(state, &failure),
                RemoteFailureKind::Unavailable => {
                    state.notify(
                        NoticeLevel::Error,
                        format!("Could not save the call outcome: {failure}"),
                    );
                    Vec::new()
                }
            }
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
