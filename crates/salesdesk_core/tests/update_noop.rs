use salesdesk_core::{update, AppState, Effect, Msg, Record};

fn loaded_and_clean() -> AppState {
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    let ticket = match effects.as_slice() {
        [Effect::FetchRecords { ticket, .. }] => *ticket,
        other => panic!("unexpected effects {other:?}"),
    };
    let (mut state, _) = update(
        state,
        Msg::RecordsFetched {
            ticket,
            result: Ok(vec![Record::new("p1", "Acme Corp")]),
        },
    );
    state.consume_dirty();
    state
}

#[test]
fn blank_input_leaves_a_loaded_console_untouched() {
    let state = loaded_and_clean();
    let (mut next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}

#[test]
fn closing_panels_that_are_not_open_changes_nothing() {
    let state = loaded_and_clean();
    let (next, effects) = update(state.clone(), Msg::DetailClosed);
    let (mut next, more) = update(next, Msg::AssignClosed);

    assert_eq!(state, next);
    assert!(effects.is_empty() && more.is_empty());
    assert!(!next.consume_dirty());
}
