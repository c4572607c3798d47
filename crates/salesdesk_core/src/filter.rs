use serde::{Deserialize, Serialize};

use crate::record::{QueueMarker, Record, Status};

/// Categorical fields that accept an equality filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    Territory,
    Industry,
    Owner,
}

impl CategoryField {
    pub const ALL: [CategoryField; 3] = [
        CategoryField::Territory,
        CategoryField::Industry,
        CategoryField::Owner,
    ];

    pub fn value_of(self, record: &Record) -> Option<&str> {
        match self {
            CategoryField::Territory => record.territory.as_deref(),
            CategoryField::Industry => record.industry.as_deref(),
            CategoryField::Owner => record.owner.as_deref(),
        }
    }
}

/// Predefined record subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    #[default]
    All,
    /// Overdue or due today.
    ActionDue,
    /// A follow-up is scheduled in the future.
    Scheduled,
    Status(Status),
}

impl Segment {
    /// Every segment in menu order.
    pub fn catalogue() -> Vec<Segment> {
        let mut segments = vec![Segment::All, Segment::ActionDue, Segment::Scheduled];
        segments.extend(Status::ALL.iter().copied().map(Segment::Status));
        segments
    }

    pub fn matches(self, record: &Record) -> bool {
        match self {
            Segment::All => true,
            Segment::ActionDue => {
                matches!(record.queue, QueueMarker::Overdue | QueueMarker::DueToday)
            }
            Segment::Scheduled => record.queue == QueueMarker::Scheduled,
            Segment::Status(status) => record.canonical_status() == Some(status),
        }
    }
}

/// Composed filter criteria. All active predicates must hold; an unset
/// predicate never excludes a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    pub query: String,
    pub territory: Option<String>,
    pub industry: Option<String>,
    pub owner: Option<String>,
    pub segment: Segment,
}

impl FilterSpec {
    pub fn category(&self, field: CategoryField) -> Option<&str> {
        match field {
            CategoryField::Territory => self.territory.as_deref(),
            CategoryField::Industry => self.industry.as_deref(),
            CategoryField::Owner => self.owner.as_deref(),
        }
    }

    /// Sets or clears a categorical constraint. Blank values clear it.
    pub fn set_category(&mut self, field: CategoryField, value: Option<String>) {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        match field {
            CategoryField::Territory => self.territory = value,
            CategoryField::Industry => self.industry = value,
            CategoryField::Owner => self.owner = value,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matches_query(record) && self.matches_categories(record) && self.segment.matches(record)
    }

    fn matches_query(&self, record: &Record) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record
            .searchable_fields()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_categories(&self, record: &Record) -> bool {
        CategoryField::ALL.iter().all(|&field| match self.category(field) {
            None => true,
            Some(wanted) => field.value_of(record) == Some(wanted),
        })
    }
}
