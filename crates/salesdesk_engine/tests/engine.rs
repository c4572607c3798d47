use std::sync::Arc;
use std::time::Duration;

use salesdesk_core::{
    CallOutcomeRecord, FetchHints, MutationRequest, MutationSummary, Record, RecordStore,
    UserOption,
};
use salesdesk_engine::{Backend, BackendError, EngineEvent, EngineHandle, FailureKind};

/// Answers record fetches after a delay taken from the `q` hint, so tests
/// can make an earlier request finish later.
struct ScriptedBackend;

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    async fn fetch_records(&self, hints: &FetchHints) -> Result<Vec<Record>, BackendError> {
        let delay_ms: u64 = hints
            .query
            .as_deref()
            .and_then(|q| q.parse().ok())
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(vec![Record::new(format!("after-{delay_ms}"), "Scripted")])
    }

    async fn fetch_users(&self) -> Result<Vec<UserOption>, BackendError> {
        std::future::pending().await
    }

    async fn mutate(&self, request: &MutationRequest) -> Result<MutationSummary, BackendError> {
        Ok(MutationSummary {
            count: request.ids.len(),
            success: true,
        })
    }

    async fn save_call_outcome(&self, _record: &CallOutcomeRecord) -> Result<(), BackendError> {
        Ok(())
    }
}

fn hints(delay_ms: u64) -> FetchHints {
    FetchHints {
        query: Some(delay_ms.to_string()),
        ..FetchHints::default()
    }
}

#[test]
fn completions_carry_their_ticket_even_out_of_order() {
    let engine = EngineHandle::with_backend(Arc::new(ScriptedBackend)).unwrap();
    let mut store = RecordStore::new();
    let slow = store.issue();
    let fast = store.issue();

    engine.fetch_records(slow, hints(300));
    engine.fetch_records(fast, hints(0));

    let first = engine.recv_timeout(Duration::from_secs(5)).expect("first event");
    let second = engine.recv_timeout(Duration::from_secs(5)).expect("second event");

    match (first, second) {
        (
            EngineEvent::RecordsFetched { ticket: t1, .. },
            EngineEvent::RecordsFetched { ticket: t2, .. },
        ) => {
            assert_eq!(t1, fast);
            assert_eq!(t2, slow);
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn mutate_reports_summary() {
    let engine = EngineHandle::with_backend(Arc::new(ScriptedBackend)).unwrap();
    engine.mutate(MutationRequest {
        action: salesdesk_core::MutationAction::Delete,
        ids: vec!["a".into(), "b".into()],
    });
    let event = engine.recv_timeout(Duration::from_secs(5)).expect("event");
    assert_eq!(
        event,
        EngineEvent::MutationCompleted {
            result: Ok(MutationSummary {
                count: 2,
                success: true
            })
        }
    );
}

#[test]
fn shutdown_cancels_in_flight_calls() {
    let engine = EngineHandle::with_backend(Arc::new(ScriptedBackend)).unwrap();
    engine.fetch_users();
    std::thread::sleep(Duration::from_millis(50));
    engine.shutdown();

    match engine.recv_timeout(Duration::from_secs(5)) {
        Some(EngineEvent::UsersFetched { result: Err(err) }) => {
            assert_eq!(err.kind, FailureKind::Cancelled);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
