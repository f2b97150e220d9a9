use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;

use super::EventService;
use crate::models::event::RawEventRecord;
use crate::models::occurrence::{Occurrence, UNKNOWN_SUMMARY};

impl EventService {
    /// Build the canonical occurrence for one (start, end) pair, or `None`
    /// when it already ended before the window's first day.
    pub(super) fn build_occurrence(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        all_day: bool,
        record: &RawEventRecord,
    ) -> Option<Occurrence> {
        let start = start.with_timezone(&self.default_tz);
        let end = end.with_timezone(&self.default_tz);
        let from_date = self.window.from.date_naive();

        if end.date_naive() < from_date {
            log::debug!("Event '{}' already ended on {}", record.display_name(), end);
            return None;
        }

        // Ended exactly at the first midnight of the window
        if end.date_naive() == from_date && end.time() == NaiveTime::MIN {
            log::debug!("Event '{}' ended at midnight {}", record.display_name(), end);
            return None;
        }

        let occurrence = Occurrence {
            summary: record
                .summary
                .clone()
                .unwrap_or_else(|| UNKNOWN_SUMMARY.to_string()),
            description: record.description.clone().unwrap_or_default(),
            location: record.location.clone().unwrap_or_default(),
            start,
            end,
            all_day,
        };

        log::debug!(
            "Adding occurrence '{}' {} - {}",
            occurrence.summary,
            occurrence.start,
            occurrence.end
        );
        Some(occurrence)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{EventService, QueryWindow};
    use crate::models::event::RawEventRecord;
    use crate::models::occurrence::UNKNOWN_SUMMARY;
    use chrono::{TimeZone, Timelike};
    use chrono_tz::Tz;

    fn service() -> EventService {
        let tz = Tz::Europe__Paris;
        EventService::new(
            QueryWindow::new(
                tz.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap(),
                tz.with_ymd_and_hms(2024, 7, 10, 0, 0, 0).unwrap(),
            ),
            tz,
        )
    }

    fn record() -> RawEventRecord {
        RawEventRecord::builder().summary("Yoga").build()
    }

    #[test]
    fn test_drops_event_ended_before_first_day() {
        let tz = Tz::Europe__Paris;
        let start = tz.with_ymd_and_hms(2024, 6, 9, 18, 0, 0).unwrap();
        let end = tz.with_ymd_and_hms(2024, 6, 9, 19, 0, 0).unwrap();
        assert!(service().build_occurrence(start, end, false, &record()).is_none());
    }

    #[test]
    fn test_drops_event_ending_at_first_midnight() {
        let tz = Tz::Europe__Paris;
        let start = tz.with_ymd_and_hms(2024, 6, 9, 0, 0, 0).unwrap();
        let end = tz.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        assert!(service().build_occurrence(start, end, true, &record()).is_none());
    }

    #[test]
    fn test_keeps_event_that_ended_earlier_today() {
        let tz = Tz::Europe__Paris;
        let start = tz.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let end = tz.with_ymd_and_hms(2024, 6, 10, 0, 0, 1).unwrap();
        assert!(service().build_occurrence(start, end, false, &record()).is_some());
    }

    #[test]
    fn test_converts_to_default_timezone() {
        let start = Tz::UTC.with_ymd_and_hms(2024, 6, 12, 8, 0, 0).unwrap();
        let end = Tz::UTC.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap();

        let occurrence = service().build_occurrence(start, end, false, &record()).unwrap();
        assert_eq!(occurrence.start.timezone(), Tz::Europe__Paris);
        assert_eq!(occurrence.start.hour(), 10);
        assert_eq!(occurrence.end.hour(), 11);
    }

    #[test]
    fn test_missing_text_fields_get_defaults() {
        let start = Tz::UTC.with_ymd_and_hms(2024, 6, 12, 8, 0, 0).unwrap();
        let occurrence = service()
            .build_occurrence(start, start, false, &RawEventRecord::default())
            .unwrap();

        assert_eq!(occurrence.summary, UNKNOWN_SUMMARY);
        assert_eq!(occurrence.description, "");
        assert_eq!(occurrence.location, "");
    }
}
