//! Agenda presentation over a published snapshot.
//! Keyword filtering, numbered upcoming slots and the next-event view with
//! its `!!` reminder offset.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};

use crate::models::occurrence::Occurrence;
use crate::services::calendar_sync::CalendarSnapshot;

/// Marker introducing a reminder offset in a summary, e.g. `Flight !!-1:30`.
pub const OFFSET_MARKER: &str = "!!";

const SECONDS_PER_DAY: i64 = 86_400;

/// Case-insensitive substring match on the summary. An empty keyword keeps
/// everything.
pub fn filter_by_keyword<'a>(occurrences: &'a [Occurrence], keyword: &str) -> Vec<&'a Occurrence> {
    let keyword = keyword.trim().to_lowercase();
    occurrences
        .iter()
        .filter(|occurrence| keyword.is_empty() || occurrence.summary.to_lowercase().contains(&keyword))
        .collect()
}

/// One numbered agenda entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaSlot {
    pub index: usize,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub all_day: bool,
    /// `floor(start - now + 1 day)` in days.
    pub eta_days: i64,
}

impl AgendaSlot {
    fn new(index: usize, occurrence: &Occurrence, now: DateTime<Utc>) -> Self {
        Self {
            index,
            summary: occurrence.summary.clone(),
            description: occurrence.description.clone(),
            location: occurrence.location.clone(),
            start: occurrence.start,
            end: occurrence.end,
            all_day: occurrence.all_day,
            eta_days: eta_days(occurrence.start, now),
        }
    }

    /// `"<summary> - 3 June 2024"`, with `" 09:00"` appended for timed events.
    pub fn state_label(&self) -> String {
        let mut label = format!("{} - {}", self.summary, self.start.format("%-d %B %Y"));
        if !self.all_day {
            label.push_str(&self.start.format(" %H:%M").to_string());
        }
        label
    }

    pub fn to_json(&self) -> Value {
        json!({
            "index": self.index,
            "state": self.state_label(),
            "summary": self.summary,
            "description": self.description,
            "location": self.location,
            "start": self.start.format("%Y%m%dT%H%M%S").to_string(),
            "end": self.end.format("%Y%m%dT%H%M%S").to_string(),
            "all_day": self.all_day,
            "eta": self.eta_days,
        })
    }
}

/// `floor((start - now + 1 day) / 1 day)`.
fn eta_days(start: DateTime<Tz>, now: DateTime<Utc>) -> i64 {
    let delta = start.with_timezone(&Utc) - now + Duration::days(1);
    delta.num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// The first `max_events` occurrences matching `keyword`.
pub fn upcoming_slots(
    occurrences: &[Occurrence],
    max_events: usize,
    keyword: &str,
    now: DateTime<Utc>,
) -> Vec<AgendaSlot> {
    filter_by_keyword(occurrences, keyword)
        .into_iter()
        .take(max_events)
        .enumerate()
        .map(|(index, occurrence)| AgendaSlot::new(index, occurrence, now))
        .collect()
}

/// Split a `!!<offset>` marker out of `summary`.
///
/// The offset is `[+-]H:MM` or `[+-]MM` (minutes). Without a readable marker
/// the summary is returned as is with a zero offset.
pub fn extract_offset(summary: &str, marker: &str) -> (String, Duration) {
    let Some(position) = summary.find(marker) else {
        return (summary.to_string(), Duration::zero());
    };

    let tail = &summary[position + marker.len()..];
    let Some((offset, consumed)) = parse_offset(tail) else {
        return (summary.to_string(), Duration::zero());
    };

    let stripped = format!("{}{}", &summary[..position], &tail[consumed..]);
    (stripped.trim().to_string(), offset)
}

/// Parse the offset at the start of `text`; returns it with the bytes read.
fn parse_offset(text: &str) -> Option<(Duration, usize)> {
    let bytes = text.as_bytes();
    let mut cursor = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            cursor += 1;
            true
        }
        Some(b'+') => {
            cursor += 1;
            false
        }
        _ => false,
    };

    let first = take_digits(bytes, &mut cursor, 2);
    let second = if bytes.get(cursor) == Some(&b':') {
        cursor += 1;
        Some(take_digits(bytes, &mut cursor, 2))
    } else {
        None
    };

    let (hours, minutes) = match (first, second) {
        (None, _) => return None,
        (Some(minutes), None) => (0, minutes),
        (Some(hours), Some(Some(minutes))) => (hours, minutes),
        (Some(_), Some(None)) => return None,
    };

    let offset = Duration::hours(hours) + Duration::minutes(minutes);
    Some((if negative { -offset } else { offset }, cursor))
}

fn take_digits(bytes: &[u8], cursor: &mut usize, max: usize) -> Option<i64> {
    let start = *cursor;
    while *cursor < bytes.len() && *cursor - start < max && bytes[*cursor].is_ascii_digit() {
        *cursor += 1;
    }
    if *cursor == start {
        return None;
    }
    std::str::from_utf8(&bytes[start..*cursor]).ok()?.parse().ok()
}

/// A non-zero offset is reached once `start + offset <= now`.
pub fn is_offset_reached(start: DateTime<Tz>, offset: Duration, now: DateTime<Utc>) -> bool {
    if offset == Duration::zero() {
        return false;
    }
    start.with_timezone(&Utc) + offset <= now
}

/// The next event as presented: offset marker stripped from the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaEvent {
    pub occurrence: Occurrence,
    pub offset: Duration,
    pub offset_reached: bool,
}

impl AgendaEvent {
    pub fn to_json(&self) -> Value {
        json!({
            "summary": self.occurrence.summary,
            "description": self.occurrence.description,
            "location": self.occurrence.location,
            "start": self.occurrence.start.to_rfc3339(),
            "end": self.occurrence.end.to_rfc3339(),
            "all_day": self.occurrence.all_day,
            "offset_minutes": self.offset.num_minutes(),
            "offset_reached": self.offset_reached,
        })
    }
}

/// The snapshot's next occurrence, unless it fails the keyword filter.
pub fn next_event(snapshot: &CalendarSnapshot, keyword: &str, now: DateTime<Utc>) -> Option<AgendaEvent> {
    let next = snapshot.next.as_ref()?;

    if filter_by_keyword(std::slice::from_ref(next), keyword).is_empty() {
        log::debug!("Next event '{}' does not match '{}'", next.summary, keyword);
        return None;
    }

    let (summary, offset) = extract_offset(&next.summary, OFFSET_MARKER);
    let occurrence = Occurrence {
        summary,
        ..next.clone()
    };
    let offset_reached = is_offset_reached(occurrence.start, offset, now);

    Some(AgendaEvent {
        occurrence,
        offset,
        offset_reached,
    })
}
