use crate::call::CallOutcomeRecord;
use crate::remote::{FetchHints, MutationRequest};
use crate::store::FetchTicket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch a fresh snapshot; report back with the same ticket.
    FetchRecords {
        ticket: FetchTicket,
        hints: FetchHints,
    },
    /// Fetch the users offered by the assign modal.
    FetchUsers,
    Mutate(MutationRequest),
    SaveCallOutcome(CallOutcomeRecord),
    /// The operator session expired; the driver must re-authenticate.
    RequireLogin,
}
