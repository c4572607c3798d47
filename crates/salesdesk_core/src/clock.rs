use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// A point in time as seen by the driver: a monotonic instant for measuring
/// elapsed time, paired with the wall-clock reading for call logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub mono: Instant,
    pub wall: DateTime<Utc>,
}

impl Moment {
    pub fn now() -> Self {
        Self {
            mono: Instant::now(),
            wall: Utc::now(),
        }
    }

    /// The same moment shifted forward by `by`.
    pub fn later(self, by: Duration) -> Self {
        let wall_delta = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            mono: self.mono + by,
            wall: self.wall + wall_delta,
        }
    }
}
