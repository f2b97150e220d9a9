//! Occurrence expansion entry point.
//! Turns extracted records into the sorted occurrence list for one query
//! window, organized across focused submodules.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::error::{EventError, EventResult};
use crate::models::event::RawEventRecord;
use crate::models::occurrence::{Occurrence, OccurrenceList};
use crate::utils::date::{self, resolve_local, NormalizedInstant};

pub mod occurrence;
pub mod queries;
pub mod recurrence;

/// Recurring events are enumerated from this many days before `from`, so
/// occurrences that already started are still caught.
pub const LOOKBACK_DAYS: i64 = 7;

/// Events that ended this many days before `from` are skipped unexpanded.
pub const LONG_PAST_DAYS: i64 = 30;

/// Half-open query window `[from, to)` in the default timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub from: DateTime<Tz>,
    pub to: DateTime<Tz>,
}

impl QueryWindow {
    pub fn new(from: DateTime<Tz>, to: DateTime<Tz>) -> Self {
        Self { from, to }
    }

    /// From the start of today (in `tz`) for `days` days.
    ///
    /// `None` when the end falls outside the representable range.
    pub fn starting_today(now: DateTime<Utc>, tz: &Tz, days: u32) -> Option<Self> {
        let from = date::start_of_day(now, tz);
        let to = from.checked_add_signed(Duration::days(i64::from(days)))?;
        Some(Self { from, to })
    }

    /// Where recurrence enumeration begins.
    pub fn lookback_start(&self) -> EventResult<DateTime<Tz>> {
        self.from
            .checked_sub_signed(Duration::days(LOOKBACK_DAYS))
            .ok_or_else(|| {
                EventError::RecurrenceEnumeration(format!(
                    "cannot enumerate from {} days before {}",
                    LOOKBACK_DAYS, self.from
                ))
            })
    }

    /// Saturates at `from` near the start of the representable range.
    pub fn long_past_cutoff(&self) -> DateTime<Tz> {
        self.from
            .checked_sub_signed(Duration::days(LONG_PAST_DAYS))
            .unwrap_or(self.from)
    }
}

/// Expands records into occurrences for one window.
pub struct EventService {
    window: QueryWindow,
    default_tz: Tz,
}

impl EventService {
    pub fn new(window: QueryWindow, default_tz: Tz) -> Self {
        Self { window, default_tz }
    }

    /// Expand every record and return the list sorted by start.
    ///
    /// A record that fails is logged and skipped; it never blocks the others.
    pub fn expand_events(&self, records: &[RawEventRecord]) -> OccurrenceList {
        let mut occurrences = Vec::new();

        for record in records {
            let result = if record.is_recurring() {
                self.generate_occurrences(record)
            } else {
                self.single_occurrence(record)
            };

            match result {
                Ok(found) => occurrences.extend(found),
                Err(err) => {
                    log::warn!("Skipping event '{}': {}", record.display_name(), err);
                }
            }
        }

        queries::sort_by_start(&mut occurrences);
        occurrences
    }

    fn single_occurrence(&self, record: &RawEventRecord) -> EventResult<Vec<Occurrence>> {
        if queries::is_long_past(record, &self.window) {
            log::debug!("Event '{}' ended long ago", record.display_name());
            return Ok(Vec::new());
        }

        let (start, end) = self.resolve_bounds(record)?;
        Ok(self
            .build_occurrence(start.instant, end, start.is_all_day, record)
            .into_iter()
            .collect())
    }

    /// Fallback zone name handed to the normalizer.
    fn fallback_zone(&self) -> &'static str {
        self.default_tz.name()
    }

    /// Normalized start, and the end (explicit or synthesized).
    ///
    /// Without `DTEND`, an all-day event ends one second before the next
    /// midnight and a timed event has zero length.
    fn resolve_bounds(&self, record: &RawEventRecord) -> EventResult<(NormalizedInstant, DateTime<Tz>)> {
        let start_property = record
            .start
            .as_ref()
            .ok_or_else(|| EventError::MalformedTimestamp("missing DTSTART".to_string()))?;
        let start = date::normalize(&start_property.parse()?, self.fallback_zone())?;

        let end = match record.end.as_ref() {
            Some(end_property) => date::normalize(&end_property.parse()?, self.fallback_zone())?.instant,
            None if start.is_all_day => {
                log::debug!("All-day event '{}' has no end, closing at 23:59:59", record.display_name());
                end_of_start_day(start.instant)
            }
            None => start.instant,
        };

        Ok((start, end))
    }
}

/// Wall-clock `start + 1 day - 1 second`, kept in the start's zone.
fn end_of_start_day(start: DateTime<Tz>) -> DateTime<Tz> {
    let tz = start.timezone();
    let wall_clock = start.naive_local() + Duration::days(1) - Duration::seconds(1);
    resolve_local(&tz, &wall_clock).unwrap_or(start + Duration::days(1) - Duration::seconds(1))
}
