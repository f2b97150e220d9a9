use chrono::{DateTime, Utc};

use crate::error::{EventError, EventResult};
use crate::services::icalendar::utils::parse_timestamp;
use crate::utils::date::{normalize_timestamp, UTC_ZONE};

/// Drop an optional `RRULE:` prefix.
pub(super) fn strip_rule_prefix(rrule: &str) -> &str {
    let trimmed = rrule.trim();
    match trimmed.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &trimmed[6..],
        _ => trimmed,
    }
}

/// Raw text of the `UNTIL=` part, if any.
pub(super) fn find_until(rrule: &str) -> Option<&str> {
    rrule.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("UNTIL")
            .then(|| value.trim())
            .filter(|value| !value.is_empty())
    })
}

/// Resolve an `UNTIL` value to an absolute instant.
///
/// Floating and date-only values are read as UTC.
pub(super) fn parse_until(until: &str) -> EventResult<DateTime<Utc>> {
    let timestamp = parse_timestamp(until, None, false)?;
    let normalized = normalize_timestamp(&timestamp, UTC_ZONE)?;
    Ok(normalized.instant.with_timezone(&Utc))
}

/// Replace the `UNTIL=` part with the UTC form `YYYYMMDDTHHMMSSZ`.
pub(super) fn rewrite_until(rrule: &str, until: DateTime<Utc>) -> String {
    rrule
        .split(';')
        .map(|part| match part.split_once('=') {
            Some((key, _)) if key.trim().eq_ignore_ascii_case("UNTIL") => {
                format!("UNTIL={}", until.format("%Y%m%dT%H%M%SZ"))
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

pub(super) fn compile_error(err: impl std::fmt::Display) -> EventError {
    EventError::RecurrenceCompile(err.to_string())
}
