//! Salesdesk engine: REST data access and effect execution.
mod backend;
mod engine;
mod types;

pub use backend::{Backend, BackendSettings, RestBackend};
pub use engine::EngineHandle;
pub use types::{BackendError, EngineEvent, FailureKind};
