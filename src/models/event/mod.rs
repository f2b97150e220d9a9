// Event module
// Raw VEVENT record as read from an iCalendar document

/// Date or date-time property exactly as written in the document.
///
/// The text is kept unparsed so a malformed value only fails the event that
/// actually needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateProperty {
    /// Property value, possibly a comma-separated group (`EXDATE`).
    pub text: String,
    /// `TZID` parameter, if any.
    pub tzid: Option<String>,
    /// `VALUE=DATE` was declared.
    pub date_only: bool,
}

impl DateProperty {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tzid: None,
            date_only: false,
        }
    }

    /// Set the `TZID` parameter
    pub fn with_tzid(mut self, tzid: impl Into<String>) -> Self {
        self.tzid = Some(tzid.into());
        self
    }

    /// Mark as `VALUE=DATE`
    pub fn date_only(mut self) -> Self {
        self.date_only = true;
        self
    }
}

/// One VEVENT with the fields the expansion pipeline reads.
///
/// Populated once at extraction time and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEventRecord {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<DateProperty>,
    pub end: Option<DateProperty>,
    pub recurrence_rule: Option<String>, // RRULE value (RFC 5545)
    pub exclusions: Vec<DateProperty>,   // One entry per EXDATE line
}

impl RawEventRecord {
    /// Create a builder for constructing records in code
    pub fn builder() -> RawEventRecordBuilder {
        RawEventRecordBuilder::new()
    }

    /// Check if this is a recurring event
    pub fn is_recurring(&self) -> bool {
        self.recurrence_rule
            .as_deref()
            .is_some_and(|rule| !rule.trim().is_empty())
    }

    /// Summary for log lines
    pub fn display_name(&self) -> &str {
        self.summary.as_deref().unwrap_or("<no summary>")
    }
}

/// Builder for creating records with optional fields
#[derive(Default)]
pub struct RawEventRecordBuilder {
    record: RawEventRecord,
}

impl RawEventRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.record.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = Some(description.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.record.location = Some(location.into());
        self
    }

    pub fn start(mut self, start: DateProperty) -> Self {
        self.record.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateProperty) -> Self {
        self.record.end = Some(end);
        self
    }

    /// Set the recurrence rule (RRULE format)
    pub fn recurrence_rule(mut self, rule: impl Into<String>) -> Self {
        self.record.recurrence_rule = Some(rule.into());
        self
    }

    /// Add one EXDATE line
    pub fn exclusion(mut self, exclusion: DateProperty) -> Self {
        self.record.exclusions.push(exclusion);
        self
    }

    pub fn build(self) -> RawEventRecord {
        self.record
    }
}
