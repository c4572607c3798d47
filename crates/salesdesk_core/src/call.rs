use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::clock::Moment;
use crate::record::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallPhase {
    #[default]
    Idle,
    Active,
    PendingOutcome,
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallPhase::Idle => "idle",
            CallPhase::Active => "active",
            CallPhase::PendingOutcome => "pending outcome",
        };
        f.write_str(label)
    }
}

/// Who is being called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    pub record_id: RecordId,
    pub display_name: String,
    pub phone: String,
    pub call_log_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSession {
    pub record_id: RecordId,
    pub display_name: String,
    pub phone: String,
    pub call_log_id: Option<String>,
    pub started: Moment,
}

impl CallSession {
    /// Whole seconds since the call started. Never negative.
    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.started.mono).as_secs()
    }
}

/// What the operator fills in after hanging up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutcomeDraft {
    pub category: String,
    pub notes: String,
}

/// The call log entry written back to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallOutcomeRecord {
    pub record_id: RecordId,
    pub phone: String,
    pub call_log_id: Option<String>,
    pub category: String,
    pub notes: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("a call with {record_id} is already in progress")]
    SessionInProgress { record_id: RecordId },
    #[error("cannot {action} while the call is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: CallPhase,
    },
    #[error("record {record_id} has no phone number")]
    MissingPhone { record_id: RecordId },
    #[error("an outcome category is required")]
    MissingCategory,
    #[error("call notes are required")]
    MissingNotes,
    #[error("the outcome is already being saved")]
    SaveInFlight,
}

/// Lifecycle of the single outbound call.
///
/// The session payload only exists in the states where it is meaningful, so
/// "outcome form shown without a session" cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallState {
    #[default]
    Idle,
    Active {
        session: CallSession,
    },
    PendingOutcome {
        session: CallSession,
        minimized: bool,
        saving: bool,
    },
}

impl CallState {
    pub fn phase(&self) -> CallPhase {
        match self {
            CallState::Idle => CallPhase::Idle,
            CallState::Active { .. } => CallPhase::Active,
            CallState::PendingOutcome { .. } => CallPhase::PendingOutcome,
        }
    }

    pub fn session(&self) -> Option<&CallSession> {
        match self {
            CallState::Idle => None,
            CallState::Active { session } | CallState::PendingOutcome { session, .. } => {
                Some(session)
            }
        }
    }

    /// Seconds since the call started, measured from the stored start
    /// instant so minimizing the outcome form never restarts the clock.
    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        self.session().map_or(0, |s| s.elapsed_secs(now))
    }

    pub fn outcome_visible(&self) -> bool {
        matches!(
            self,
            CallState::PendingOutcome {
                minimized: false,
                ..
            }
        )
    }

    pub fn is_saving(&self) -> bool {
        matches!(self, CallState::PendingOutcome { saving: true, .. })
    }

    fn invalid(&self, action: &'static str) -> CallError {
        CallError::InvalidTransition {
            action,
            phase: self.phase(),
        }
    }

    pub fn start(&mut self, target: CallTarget, at: Moment) -> Result<(), CallError> {
        if let Some(session) = self.session() {
            return Err(CallError::SessionInProgress {
                record_id: session.record_id.clone(),
            });
        }
        if target.phone.trim().is_empty() {
            return Err(CallError::MissingPhone {
                record_id: target.record_id,
            });
        }
        *self = CallState::Active {
            session: CallSession {
                record_id: target.record_id,
                display_name: target.display_name,
                phone: target.phone,
                call_log_id: target.call_log_id,
                started: at,
            },
        };
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), CallError> {
        match std::mem::take(self) {
            CallState::Active { session } => {
                *self = CallState::PendingOutcome {
                    session,
                    minimized: false,
                    saving: false,
                };
                Ok(())
            }
            other => {
                *self = other;
                Err(self.invalid("end the call"))
            }
        }
    }

    pub fn minimize(&mut self) -> Result<(), CallError> {
        self.set_minimized(true, "minimize the outcome form")
    }

    pub fn reopen(&mut self) -> Result<(), CallError> {
        self.set_minimized(false, "reopen the outcome form")
    }

    fn set_minimized(&mut self, value: bool, action: &'static str) -> Result<(), CallError> {
        let rejected = self.invalid(action);
        match self {
            CallState::PendingOutcome { minimized, .. } => {
                *minimized = value;
                Ok(())
            }
            _ => Err(rejected),
        }
    }

    /// Drops the pending session without writing anything. Refused while a
    /// save is in flight, since the outcome may already be written.
    pub fn discard(&mut self) -> Result<CallSession, CallError> {
        match std::mem::take(self) {
            CallState::PendingOutcome {
                session,
                saving: false,
                ..
            } => Ok(session),
            in_flight @ CallState::PendingOutcome { saving: true, .. } => {
                *self = in_flight;
                Err(CallError::SaveInFlight)
            }
            other => {
                *self = other;
                Err(self.invalid("discard the call"))
            }
        }
    }

    /// Validates the draft and builds the record to write. The session stays
    /// pending until [`CallState::save_succeeded`] confirms the write.
    pub fn begin_save(
        &mut self,
        draft: &OutcomeDraft,
        at: Moment,
    ) -> Result<CallOutcomeRecord, CallError> {
        let rejected = self.invalid("save the outcome");
        let CallState::PendingOutcome {
            session, saving, ..
        } = self
        else {
            return Err(rejected);
        };
        if *saving {
            return Err(CallError::SaveInFlight);
        }
        let category = draft.category.trim();
        if category.is_empty() {
            return Err(CallError::MissingCategory);
        }
        let notes = draft.notes.trim();
        if notes.is_empty() {
            return Err(CallError::MissingNotes);
        }

        *saving = true;
        Ok(CallOutcomeRecord {
            record_id: session.record_id.clone(),
            phone: session.phone.clone(),
            call_log_id: session.call_log_id.clone(),
            category: category.to_string(),
            notes: notes.to_string(),
            started_at: session.started.wall,
            duration_secs: session.elapsed_secs(at.mono),
        })
    }

    pub fn save_succeeded(&mut self) -> Result<CallSession, CallError> {
        match std::mem::take(self) {
            CallState::PendingOutcome {
                session,
                saving: true,
                ..
            } => Ok(session),
            other => {
                *self = other;
                Err(self.invalid("complete a save"))
            }
        }
    }

    /// Keeps the session pending so the operator can retry or discard.
    pub fn save_failed(&mut self) -> Result<(), CallError> {
        let rejected = self.invalid("fail a save");
        match self {
            CallState::PendingOutcome {
                saving, minimized, ..
            } if *saving => {
                *saving = false;
                *minimized = false;
                Ok(())
            }
            _ => Err(rejected),
        }
    }
}
