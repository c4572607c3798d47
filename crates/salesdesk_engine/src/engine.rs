use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use desk_logging::{desk_debug, desk_info, desk_warn};
use salesdesk_core::{CallOutcomeRecord, FetchHints, FetchTicket, MutationRequest};
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, BackendSettings, RestBackend};
use crate::{BackendError, EngineEvent, FailureKind};

enum EngineCommand {
    FetchRecords {
        ticket: FetchTicket,
        hints: FetchHints,
    },
    FetchUsers,
    Mutate(MutationRequest),
    SaveCallOutcome(CallOutcomeRecord),
}

/// Runs backend calls on a dedicated tokio runtime thread and reports each
/// completion as an [`EngineEvent`]. Calls run concurrently, so completions
/// may arrive in any order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let backend = RestBackend::new(settings)?;
        Self::with_backend(Arc::new(backend))
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))
    }

    pub fn with_backend(backend: Arc<dyn Backend>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("salesdesk-engine")
            .build()?;

        let loop_cancel = cancel.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                if loop_cancel.is_cancelled() {
                    break;
                }
                let backend = backend.clone();
                let event_tx = event_tx.clone();
                let cancel = loop_cancel.clone();
                runtime.spawn(async move {
                    let event = handle_command(backend.as_ref(), command, &cancel).await;
                    let _ = event_tx.send(event);
                });
            }
            desk_info!("Engine command loop stopped");
            runtime.shutdown_timeout(Duration::from_millis(500));
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            cancel,
        })
    }

    pub fn fetch_records(&self, ticket: FetchTicket, hints: FetchHints) {
        self.send(EngineCommand::FetchRecords { ticket, hints });
    }

    pub fn fetch_users(&self) {
        self.send(EngineCommand::FetchUsers);
    }

    pub fn mutate(&self, request: MutationRequest) {
        self.send(EngineCommand::Mutate(request));
    }

    pub fn save_call_outcome(&self, record: CallOutcomeRecord) {
        self.send(EngineCommand::SaveCallOutcome(record));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Cancels in-flight calls; they report `FailureKind::Cancelled`.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            desk_warn!("Engine command loop is gone; dropping command");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn handle_command(
    backend: &dyn Backend,
    command: EngineCommand,
    cancel: &CancellationToken,
) -> EngineEvent {
    match command {
        EngineCommand::FetchRecords { ticket, hints } => {
            desk_debug!("Fetching records for #{}", ticket.seq());
            let result = cancellable(cancel, backend.fetch_records(&hints)).await;
            EngineEvent::RecordsFetched { ticket, result }
        }
        EngineCommand::FetchUsers => {
            let result = cancellable(cancel, backend.fetch_users()).await;
            EngineEvent::UsersFetched { result }
        }
        EngineCommand::Mutate(request) => {
            desk_debug!("Sending {} for {} ids", request.action.label(), request.ids.len());
            let result = cancellable(cancel, backend.mutate(&request)).await;
            EngineEvent::MutationCompleted { result }
        }
        EngineCommand::SaveCallOutcome(record) => {
            let result = cancellable(cancel, backend.save_call_outcome(&record)).await;
            EngineEvent::CallOutcomeSaved { result }
        }
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl std::future::Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(BackendError::new(FailureKind::Cancelled, "engine shut down")),
        result = call => result,
    }
}
