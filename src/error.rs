//! Error types shared by the parsing, expansion and refresh layers.

use thiserror::Error;

/// The calendar document could not be read at all. Fatal for a refresh.
#[derive(Debug, Error)]
pub enum DocumentParseError {
    #[error("calendar document is empty or has no VCALENDAR component")]
    MissingCalendar,

    #[error("malformed calendar document: {0}")]
    Malformed(String),
}

/// A single event could not be processed. The event is skipped and the rest
/// of the calendar is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("unresolved timezone '{0}'")]
    TimezoneResolution(String),

    #[error("malformed timestamp '{0}'")]
    MalformedTimestamp(String),

    #[error("invalid recurrence rule: {0}")]
    RecurrenceCompile(String),

    #[error("recurrence enumeration failed: {0}")]
    RecurrenceEnumeration(String),
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to load calendar source: {0:#}")]
    Load(anyhow::Error),

    #[error(transparent)]
    Parse(#[from] DocumentParseError),

    #[error("a {days}-day window from {from} is out of range")]
    WindowOutOfRange { days: u32, from: chrono::DateTime<chrono::Utc> },
}

pub type EventResult<T> = std::result::Result<T, EventError>;
