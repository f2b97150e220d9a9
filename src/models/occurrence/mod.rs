// Occurrence module
// One concrete materialization of an event

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Summary used when a VEVENT has none.
pub const UNKNOWN_SUMMARY: &str = "Unknown";

/// A concrete (start, end) materialization of an event, recurring or not.
///
/// Start and end are expressed in the calendar's default timezone.
/// `end >= start` is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub all_day: bool,
}

/// Ascending by start, duplicates kept.
pub type OccurrenceList = Vec<Occurrence>;

impl Occurrence {
    /// Get the duration of the occurrence
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap test against `[window_start, window_end)`.
    pub fn overlaps(&self, window_start: DateTime<Tz>, window_end: DateTime<Tz>) -> bool {
        self.start < window_end && self.end > window_start
    }
}
