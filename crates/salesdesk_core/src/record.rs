use std::fmt;

use serde::{Deserialize, Serialize};

pub type RecordId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    #[default]
    Prospect,
    User,
}

/// Canonical pipeline status. Records carry the raw backend spelling; use
/// [`Status::normalize`] to map it onto this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::New,
        Status::Contacted,
        Status::Qualified,
        Status::Proposal,
        Status::Negotiation,
        Status::Won,
        Status::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Contacted => "contacted",
            Status::Qualified => "qualified",
            Status::Proposal => "proposal",
            Status::Negotiation => "negotiation",
            Status::Won => "won",
            Status::Lost => "lost",
        }
    }

    /// Maps a raw status string onto the canonical enumeration.
    ///
    /// Matching ignores case and treats `_` and `-` as spaces, so the legacy
    /// spellings "closed won" / "Closed_Lost" fold onto `Won` / `Lost`.
    pub fn normalize(raw: &str) -> Option<Status> {
        let folded = raw
            .to_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match folded.as_str() {
            "new" => Some(Status::New),
            "contacted" => Some(Status::Contacted),
            "qualified" => Some(Status::Qualified),
            "proposal" => Some(Status::Proposal),
            "negotiation" => Some(Status::Negotiation),
            "won" | "closed won" => Some(Status::Won),
            "lost" | "closed lost" => Some(Status::Lost),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work-queue marker assigned by the backend. The engine never derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueMarker {
    Overdue,
    DueToday,
    Scheduled,
    #[default]
    None,
}

impl QueueMarker {
    /// Lower is more urgent.
    pub fn priority(self) -> u8 {
        match self {
            QueueMarker::Overdue => 0,
            QueueMarker::DueToday => 1,
            QueueMarker::Scheduled => 2,
            QueueMarker::None => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub kind: RecordKind,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub territory: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub queue: QueueMarker,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: RecordKind::Prospect,
            name: name.into(),
            company: None,
            email: None,
            phone: None,
            status: Status::New.as_str().to_string(),
            territory: None,
            industry: None,
            owner: None,
            queue: QueueMarker::None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_queue(mut self, queue: QueueMarker) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_territory(mut self, territory: impl Into<String>) -> Self {
        self.territory = Some(territory.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn canonical_status(&self) -> Option<Status> {
        Status::normalize(&self.status)
    }

    /// Fields consulted by free-text search, in display order.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.company.as_deref())
            .chain(self.email.as_deref())
            .chain(self.phone.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_closed_statuses_fold_onto_canonical() {
        assert_eq!(Status::normalize("closed won"), Some(Status::Won));
        assert_eq!(Status::normalize("Closed_Lost"), Some(Status::Lost));
        assert_eq!(Status::normalize("  CLOSED-won "), Some(Status::Won));
        assert_eq!(Status::normalize("won"), Some(Status::Won));
        assert_eq!(Status::normalize("archived"), None);
    }

    #[test]
    fn queue_priority_ranks_overdue_first() {
        let mut markers = vec![
            QueueMarker::None,
            QueueMarker::Scheduled,
            QueueMarker::Overdue,
            QueueMarker::DueToday,
        ];
        markers.sort_by_key(|m| m.priority());
        assert_eq!(
            markers,
            vec![
                QueueMarker::Overdue,
                QueueMarker::DueToday,
                QueueMarker::Scheduled,
                QueueMarker::None
            ]
        );
    }
}
