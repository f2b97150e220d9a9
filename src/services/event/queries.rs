use chrono::DateTime;
use chrono_tz::Tz;

use super::QueryWindow;
use crate::models::event::RawEventRecord;
use crate::models::occurrence::Occurrence;
use crate::utils::date::RawTimestamp;

/// Stable sort by start; equal starts keep their relative order.
pub fn sort_by_start(occurrences: &mut [Occurrence]) {
    occurrences.sort_by_key(|occurrence| occurrence.start);
}

/// Occurrences overlapping `[start, end)`, in list order.
pub fn overlapping(occurrences: &[Occurrence], start: DateTime<Tz>, end: DateTime<Tz>) -> Vec<Occurrence> {
    occurrences
        .iter()
        .filter(|occurrence| occurrence.overlaps(start, end))
        .cloned()
        .collect()
}

/// First occurrence still running or yet to come at `now`.
pub fn next_after(occurrences: &[Occurrence], now: DateTime<Tz>) -> Option<Occurrence> {
    occurrences
        .iter()
        .find(|occurrence| occurrence.end > now)
        .cloned()
}

/// Whether a non-recurring record ended well before the window.
///
/// Compares the calendar date of `DTEND` as written, without zone
/// resolution. Unreadable or missing ends are never long past.
pub(super) fn is_long_past(record: &RawEventRecord, window: &QueryWindow) -> bool {
    let Some(end) = record.end.as_ref() else {
        return false;
    };
    let Ok(value) = end.parse() else {
        return false;
    };

    let end_date = match value.values().first() {
        Some(RawTimestamp::Date(date)) => *date,
        Some(RawTimestamp::DateTime(naive, _)) => naive.date(),
        None => return false,
    };

    end_date < window.long_past_cutoff().date_naive()
}
