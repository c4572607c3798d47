//! Shapes exchanged with the data-access layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::FilterSpec;
use crate::record::{RecordId, Status};

/// Advisory server-side narrowing. The view re-filters locally regardless.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FetchHints {
    pub query: Option<String>,
    pub territory: Option<String>,
    pub industry: Option<String>,
    pub owner: Option<String>,
}

impl FetchHints {
    pub fn from_filter(filter: &FilterSpec, min_query_len: usize) -> Self {
        let query = filter.query.trim();
        Self {
            query: (query.chars().count() >= min_query_len && !query.is_empty())
                .then(|| query.to_string()),
            territory: filter.territory.clone(),
            industry: filter.industry.clone(),
            owner: filter.owner.clone(),
        }
    }

    /// True when a snapshot fetched with `self` holds every record a fetch
    /// with `wanted` would return, so local filtering alone stays correct.
    pub fn covers(&self, wanted: &FetchHints) -> bool {
        let query_covered = match (&self.query, &wanted.query) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(have), Some(want)) => want.to_lowercase().contains(&have.to_lowercase()),
        };
        query_covered
            && category_covers(&self.territory, &wanted.territory)
            && category_covers(&self.industry, &wanted.industry)
            && category_covers(&self.owner, &wanted.owner)
    }
}

fn category_covers(have: &Option<String>, want: &Option<String>) -> bool {
    have.is_none() || have == want
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MutationAction {
    Assign { owner_id: String },
    ChangeStatus { status: Status },
    Delete,
}

impl MutationAction {
    pub fn label(&self) -> &'static str {
        match self {
            MutationAction::Assign { .. } => "assign",
            MutationAction::ChangeStatus { .. } => "status change",
            MutationAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationRequest {
    #[serde(flatten)]
    pub action: MutationAction,
    pub ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MutationSummary {
    pub count: usize,
    pub success: bool,
}

/// A user that records can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFailureKind {
    /// The operator's session expired; only re-authentication helps.
    Unauthorized,
    /// Anything else: network, HTTP status, decode, timeout.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub kind: RemoteFailureKind,
    pub message: String,
}

impl RemoteFailure {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteFailureKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteFailureKind::Unauthorized,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
