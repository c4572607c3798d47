use std::sync::Once;

use pretty_assertions::assert_eq;
use salesdesk_core::{
    update, AppState, CategoryField, Effect, FetchTicket, MutationAction, MutationSummary, Msg,
    Record, UserOption, ViewSettings,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(desk_logging::initialize_for_tests);
}

fn fetch_ticket(effects: &[Effect]) -> FetchTicket {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchRecords { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("fetch effect")
}

fn load(state: AppState, records: Vec<Record>) -> AppState {
    let (state, effects) = update(state, Msg::RefreshRequested);
    let ticket = fetch_ticket(&effects);
    update(
        state,
        Msg::RecordsFetched {
            ticket,
            result: Ok(records),
        },
    )
    .0
}

fn roster() -> Vec<Record> {
    vec![
        Record::new("n1", "North One").with_territory("North"),
        Record::new("n2", "North Two").with_territory("North"),
        Record::new("n3", "North Three").with_territory("North"),
        Record::new("s1", "South One").with_territory("South"),
    ]
}

fn in_bulk_mode(records: Vec<Record>) -> AppState {
    let state = load(AppState::new(), records);
    update(state, Msg::BulkModeEntered).0
}

fn filter_territory(state: AppState, territory: Option<&str>) -> AppState {
    update(
        state,
        Msg::CategoryChanged {
            field: CategoryField::Territory,
            value: territory.map(str::to_string),
        },
    )
    .0
}

#[test]
fn selection_survives_filter_churn() {
    init_logging();
    let state = in_bulk_mode(roster());
    let (state, _) = update(state, Msg::SelectionToggled("s1".into()));
    let state = filter_territory(state, Some("North"));
    assert!(state.selection().is_selected("s1"));
    assert!(!state.view().rows.iter().any(|r| r.id == "s1"));

    let state = filter_territory(state, None);
    let view = state.view();
    let row = view.rows.iter().find(|r| r.id == "s1").unwrap();
    assert!(row.selected);
}

#[test]
fn select_all_covers_filtered_set_not_page_or_snapshot() {
    init_logging();
    let settings = ViewSettings {
        page_size: 2,
        ..ViewSettings::default()
    };
    let state = load(AppState::with_settings(settings), roster());
    let (state, _) = update(state, Msg::BulkModeEntered);
    let state = filter_territory(state, Some("North"));
    assert_eq!(state.view().rows.len(), 2);

    let (state, _) = update(state, Msg::SelectAllToggled);
    let view = state.view();
    assert_eq!(view.selection.ids, vec!["n1", "n2", "n3"]);
    assert!(view.selection.all_visible_selected);

    // Header checkbox again clears.
    let (state, _) = update(state, Msg::SelectAllToggled);
    assert!(state.view().selection.ids.is_empty());
    assert!(!state.view().selection.all_visible_selected);
}

#[test]
fn all_visible_selected_tracks_the_current_filter() {
    init_logging();
    let state = in_bulk_mode(roster());
    let (state, _) = update(state, Msg::SelectionToggled("s1".into()));
    assert!(!state.view().selection.all_visible_selected);

    let state = filter_territory(state, Some("South"));
    assert!(state.view().selection.all_visible_selected);

    let state = filter_territory(state, Some("Nowhere"));
    assert!(!state.view().selection.all_visible_selected);
}

#[test]
fn toggles_outside_bulk_mode_are_ignored() {
    init_logging();
    let state = load(AppState::new(), roster());
    let (state, _) = update(state, Msg::SelectionToggled("n1".into()));
    assert!(state.selection().is_empty());
}

#[test]
fn entering_and_exiting_bulk_mode_start_clean() {
    init_logging();
    let state = in_bulk_mode(roster());
    let (state, _) = update(state, Msg::SelectionToggled("n1".into()));
    let (state, _) = update(state, Msg::BulkModeExited);
    assert!(state.selection().is_empty());
    let (state, _) = update(state, Msg::BulkModeEntered);
    assert!(state.selection().is_empty());
    assert!(state.view().selection.bulk_mode);
}

#[test]
fn vanished_records_drop_out_of_the_selection() {
    init_logging();
    let state = in_bulk_mode(roster());
    let (state, _) = update(state, Msg::SelectionToggled("n1".into()));
    let (state, _) = update(state, Msg::SelectionToggled("n2".into()));

    let survivors = roster().into_iter().filter(|r| r.id != "n2").collect();
    let state = load(state, survivors);
    assert_eq!(state.view().selection.ids, vec!["n1"]);
}

#[test]
fn bulk_action_targets_selection_and_clears_it_on_success() {
    init_logging();
    let state = in_bulk_mode(roster());
    let (state, _) = update(state, Msg::SelectionToggled("n3".into()));
    let (state, _) = update(state, Msg::SelectionToggled("s1".into()));

    let (state, effects) = update(state, Msg::BulkActionRequested(MutationAction::Delete));
    match effects.as_slice() {
        [Effect::Mutate(request)] => {
            assert_eq!(request.action, MutationAction::Delete);
            assert_eq!(request.ids, vec!["n3", "s1"]);
        }
        other => panic!("unexpected effects {other:?}"),
    }

    let (state, effects) = update(
        state,
        Msg::MutationCompleted {
            result: Ok(MutationSummary {
                count: 2,
                success: true,
            }),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::FetchRecords { .. }]));
    assert!(state.selection().is_empty());
    assert!(state.selection().in_bulk_mode());
}

#[test]
fn assign_modal_fetches_users_and_clears_on_close() {
    init_logging();
    let state = in_bulk_mode(roster());
    let (state, _) = update(state, Msg::SelectionToggled("n1".into()));
    let (state, effects) = update(state, Msg::AssignOpened { ids: None });
    assert_eq!(effects, vec![Effect::FetchUsers]);
    assert!(state.view().assign.unwrap().loading);

    let users = vec![
        UserOption {
            id: "u1".into(),
            name: "Dana Reyes".into(),
        },
        UserOption {
            id: "u2".into(),
            name: "Sam Ortiz".into(),
        },
    ];
    let (state, _) = update(state, Msg::UsersFetched { result: Ok(users) });
    let (state, _) = update(state, Msg::AssignQueryChanged("sam".into()));
    let assign = state.view().assign.unwrap();
    assert_eq!(assign.users.len(), 1);
    assert_eq!(assign.target_count, 1);

    let (state, _) = update(state, Msg::AssignClosed);
    assert!(state.view().assign.is_none());

    // Late users response after close is dropped.
    let (state, effects) = update(state, Msg::UsersFetched { result: Ok(vec![]) });
    assert!(effects.is_empty());
    assert!(state.view().assign.is_none());
}

#[test]
fn assign_confirm_emits_mutation_for_targets() {
    init_logging();
    let state = load(AppState::new(), roster());
    let (state, _) = update(
        state,
        Msg::AssignOpened {
            ids: Some(vec!["n2".into(), "ghost".into()]),
        },
    );
    let (state, _) = update(
        state,
        Msg::UsersFetched {
            result: Ok(vec![UserOption {
                id: "u1".into(),
                name: "Dana Reyes".into(),
            }]),
        },
    );

    let (state, effects) = update(
        state,
        Msg::AssignConfirmed {
            owner_id: "unknown".into(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().assign.is_some());

    let (state, effects) = update(
        state,
        Msg::AssignConfirmed {
            owner_id: "u1".into(),
        },
    );
    match effects.as_slice() {
        [Effect::Mutate(request)] => {
            assert_eq!(
                request.action,
                MutationAction::Assign {
                    owner_id: "u1".into()
                }
            );
            assert_eq!(request.ids, vec!["n2"]);
        }
        other => panic!("unexpected effects {other:?}"),
    }
    assert!(state.view().assign.is_none());
}
