// Date utility functions
// Turns raw iCalendar timestamps into timezone-aware instants

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::{EventError, EventResult};

/// Zone name suffixes that always mean UTC, even when the full name is not
/// an IANA identifier (e.g. `(UTC+00:00) UTC`, `Custom/GMT`).
const UTC_ALIASES: [&str; 5] = ["UTC", "GMT", "Universal", "Zulu", "Z"];

/// Fallback zone name for values that must be read as UTC.
pub const UTC_ZONE: &str = "UTC";

/// Timezone attached to a date-time as written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Zone {
    /// No `TZID` and no trailing `Z`.
    Floating,
    /// Trailing `Z`.
    Utc,
    /// `TZID` parameter, verbatim.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTimestamp {
    Date(NaiveDate),
    DateTime(NaiveDateTime, Zone),
}

/// A property value: one timestamp, or a comma-separated group of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Single(RawTimestamp),
    Sequence(Vec<RawTimestamp>),
}

impl RawValue {
    pub fn values(&self) -> &[RawTimestamp] {
        match self {
            RawValue::Single(value) => std::slice::from_ref(value),
            RawValue::Sequence(values) => values,
        }
    }
}

impl From<RawTimestamp> for RawValue {
    fn from(value: RawTimestamp) -> Self {
        RawValue::Single(value)
    }
}

/// A resolved instant plus whether the source value had no time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedInstant {
    pub instant: DateTime<Tz>,
    pub is_all_day: bool,
}

/// Normalize a raw value against a fallback timezone name.
///
/// Sequences are unwrapped to their first element. Date-only values become
/// local midnight in the fallback zone and are flagged all-day.
pub fn normalize(value: &RawValue, fallback: &str) -> EventResult<NormalizedInstant> {
    let timestamp = value
        .values()
        .first()
        .ok_or_else(|| EventError::MalformedTimestamp("empty value list".to_string()))?;
    normalize_timestamp(timestamp, fallback)
}

pub fn normalize_timestamp(timestamp: &RawTimestamp, fallback: &str) -> EventResult<NormalizedInstant> {
    log::trace!("Normalizing {:?} with fallback zone {}", timestamp, fallback);

    match timestamp {
        RawTimestamp::Date(date) => {
            let midnight = date.and_time(NaiveTime::MIN);
            Ok(NormalizedInstant {
                instant: attach_fallback(&midnight, fallback)?,
                is_all_day: true,
            })
        }
        RawTimestamp::DateTime(naive, zone) => {
            let instant = match zone {
                Zone::Floating => attach_fallback(naive, fallback)?,
                Zone::Utc => Tz::UTC.from_utc_datetime(naive),
                Zone::Named(name) => {
                    let tz = resolve_zone_name(name)?;
                    resolve_local(&tz, naive)
                        .ok_or_else(|| EventError::TimezoneResolution(name.clone()))?
                }
            };
            Ok(NormalizedInstant {
                instant,
                is_all_day: false,
            })
        }
    }
}

/// Resolve a `TZID` value to an IANA zone.
///
/// Vendor-prefixed identifiers such as `/mozilla.org/20050126_1/Europe/Paris`
/// are retried with their leading path segments removed.
pub fn resolve_zone_name(name: &str) -> EventResult<Tz> {
    let trimmed = name.trim().trim_matches('"');

    if let Ok(tz) = Tz::from_str(trimmed) {
        return Ok(tz);
    }

    let segments: Vec<&str> = trimmed.split('/').filter(|part| !part.is_empty()).collect();
    for skip in 0..segments.len() {
        if let Ok(tz) = Tz::from_str(&segments[skip..].join("/")) {
            return Ok(tz);
        }
    }

    if UTC_ALIASES.iter().any(|alias| trimmed.ends_with(alias)) {
        return Ok(Tz::UTC);
    }

    Err(EventError::TimezoneResolution(trimmed.to_string()))
}

/// Attach the fallback zone to a wall-clock time.
fn attach_fallback(naive: &NaiveDateTime, fallback: &str) -> EventResult<DateTime<Tz>> {
    let tz = resolve_zone_name(fallback)?;
    resolve_local(&tz, naive).ok_or_else(|| EventError::TimezoneResolution(fallback.to_string()))
}

/// Wall-clock time to instant. Ambiguous times take the earlier instant;
/// times inside a DST gap move forward past the gap.
pub fn resolve_local(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(*naive + Duration::hours(1))).earliest())
}

/// Midnight at the start of `now`'s calendar day in `tz`.
pub fn start_of_day(now: DateTime<Utc>, tz: &Tz) -> DateTime<Tz> {
    let local_date = now.with_timezone(tz).date_naive();
    resolve_local(tz, &local_date.and_time(NaiveTime::MIN))
        .unwrap_or_else(|| now.with_timezone(tz))
}
