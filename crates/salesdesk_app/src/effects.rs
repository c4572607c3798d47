use desk_logging::{desk_info, desk_warn};
use salesdesk_core::{Effect, Msg, RemoteFailure};
use salesdesk_engine::{BackendError, EngineEvent, EngineHandle};

/// Hands reducer effects to the engine and turns engine completions back
/// into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Runs `effects` and returns whether any of them asks the operator to
    /// sign in again.
    pub fn enqueue(&self, effects: Vec<Effect>) -> bool {
        let mut login_required = false;
        for effect in effects {
            match effect {
                Effect::FetchRecords { ticket, hints } => {
                    desk_info!(
                        "FetchRecords ticket=#{} query={:?}",
                        ticket.seq(),
                        hints.query
                    );
                    self.engine.fetch_records(ticket, hints);
                }
                Effect::FetchUsers => self.engine.fetch_users(),
                Effect::Mutate(request) => {
                    desk_info!(
                        "Mutate action={} ids={}",
                        request.action.label(),
                        request.ids.len()
                    );
                    self.engine.mutate(request);
                }
                Effect::SaveCallOutcome(record) => {
                    desk_info!(
                        "SaveCallOutcome record={} duration={}s",
                        record.record_id,
                        record.duration_secs
                    );
                    self.engine.save_call_outcome(record);
                }
                Effect::RequireLogin => {
                    desk_warn!("Backend rejected the session token");
                    login_required = true;
                }
            }
        }
        login_required
    }

    /// Completions that arrived since the last call, as messages.
    pub fn drain(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .map(event_to_msg)
            .collect()
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RecordsFetched { ticket, result } => Msg::RecordsFetched {
            ticket,
            result: result.map_err(to_remote),
        },
        EngineEvent::UsersFetched { result } => Msg::UsersFetched {
            result: result.map_err(to_remote),
        },
        EngineEvent::MutationCompleted { result } => Msg::MutationCompleted {
            result: result.map_err(to_remote),
        },
        EngineEvent::CallOutcomeSaved { result } => Msg::OutcomeSaveCompleted {
            result: result.map_err(to_remote),
        },
    }
}

/// The core only distinguishes an expired session from everything else.
fn to_remote(err: BackendError) -> RemoteFailure {
    if err.is_unauthorized() {
        RemoteFailure::unauthorized(err.to_string())
    } else {
        desk_warn!("Backend call failed: {}", err);
        RemoteFailure::unavailable(err.to_string())
    }
}
