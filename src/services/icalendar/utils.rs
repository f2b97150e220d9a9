use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{EventError, EventResult};
use crate::models::event::DateProperty;
use crate::utils::date::{RawTimestamp, RawValue, Zone};

pub(crate) fn unescape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

impl DateProperty {
    /// Parse the property text into raw timestamps.
    ///
    /// A comma-separated group yields a [`RawValue::Sequence`].
    pub fn parse(&self) -> EventResult<RawValue> {
        let mut values = self
            .text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| parse_timestamp(part, self.tzid.as_deref(), self.date_only))
            .collect::<EventResult<Vec<_>>>()?;

        match values.len() {
            0 => Err(EventError::MalformedTimestamp(self.text.clone())),
            1 => Ok(RawValue::Single(values.remove(0))),
            _ => Ok(RawValue::Sequence(values)),
        }
    }
}

/// Parse one `YYYYMMDD` or `YYYYMMDDTHHMMSS[Z]` value.
pub(crate) fn parse_timestamp(s: &str, tzid: Option<&str>, date_only: bool) -> EventResult<RawTimestamp> {
    if date_only || !s.contains('T') {
        return parse_date(s).map(RawTimestamp::Date);
    }

    let normalized = s.strip_suffix(['Z', 'z']);
    let has_utc_suffix = normalized.is_some();
    let naive = parse_naive_datetime(normalized.unwrap_or(s))?;

    let zone = if has_utc_suffix {
        Zone::Utc
    } else if let Some(name) = tzid.map(str::trim).filter(|name| !name.is_empty()) {
        Zone::Named(name.to_string())
    } else {
        Zone::Floating
    };

    Ok(RawTimestamp::DateTime(naive, zone))
}

fn parse_naive_datetime(s: &str) -> EventResult<NaiveDateTime> {
    let malformed = || EventError::MalformedTimestamp(s.to_string());

    if s.len() != 15 || !s.is_ascii() || s.as_bytes()[8] != b'T' {
        return Err(malformed());
    }

    let date = parse_date(&s[0..8])?;
    let hour: u32 = s[9..11].parse().map_err(|_| malformed())?;
    let minute: u32 = s[11..13].parse().map_err(|_| malformed())?;
    let second: u32 = s[13..15].parse().map_err(|_| malformed())?;

    // Leap seconds (60) clamp to 59
    let time = NaiveTime::from_hms_opt(hour, minute, second.min(59)).ok_or_else(malformed)?;
    Ok(date.and_time(time))
}

fn parse_date(s: &str) -> EventResult<NaiveDate> {
    let malformed = || EventError::MalformedTimestamp(s.to_string());

    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let year: i32 = s[0..4].parse().map_err(|_| malformed())?;
    let month: u32 = s[4..6].parse().map_err(|_| malformed())?;
    let day: u32 = s[6..8].parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}
