// Test fixtures - reusable calendar documents
// Provides consistent ICS data across all test files

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

/// Reference instants for testing
pub mod dates {
    use super::*;

    /// Saturday June 1, 2024 at 08:00 in Paris
    pub fn june_1_2024_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap()
    }

    /// Monday June 3, 2024 at 10:00 in Paris, after the standup ended
    pub fn june_3_2024_after_standup() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()
    }
}

/// Sample calendar documents
pub mod ics {
    /// Wraps VEVENT blocks in a VCALENDAR.
    pub fn calendar(events: &[&str]) -> String {
        let mut document = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Fixtures//EN\r\n");
        for event in events {
            document.push_str(event);
        }
        document.push_str("END:VCALENDAR\r\n");
        document
    }

    pub const DENTIST: &str = "BEGIN:VEVENT\r\n\
UID:dentist@example.com\r\n\
SUMMARY:Dentist\r\n\
LOCATION:Rue de Rivoli 12\r\n\
DTSTART:20240601T100000\r\n\
DTEND:20240601T110000\r\n\
END:VEVENT\r\n";

    pub const WEEKLY_STANDUP: &str = "BEGIN:VEVENT\r\n\
UID:standup@example.com\r\n\
SUMMARY:Standup\r\n\
DTSTART;TZID=Europe/Paris:20240603T090000\r\n\
DTEND;TZID=Europe/Paris:20240603T093000\r\n\
RRULE:FREQ=WEEKLY;COUNT=3\r\n\
EXDATE;TZID=Europe/Paris:20240610T090000\r\n\
END:VEVENT\r\n";

    pub const HOLIDAY: &str = "BEGIN:VEVENT\r\n\
UID:holiday@example.com\r\n\
SUMMARY:Bank holiday\r\n\
DTSTART;VALUE=DATE:20240612\r\n\
END:VEVENT\r\n";

    pub const ENDED_AT_MIDNIGHT: &str = "BEGIN:VEVENT\r\n\
UID:yesterday@example.com\r\n\
SUMMARY:Yesterday\r\n\
DTSTART;VALUE=DATE:20240531\r\n\
DTEND;VALUE=DATE:20240601\r\n\
END:VEVENT\r\n";

    pub const BROKEN_RULE: &str = "BEGIN:VEVENT\r\n\
UID:broken@example.com\r\n\
SUMMARY:Broken\r\n\
DTSTART:20240603T120000Z\r\n\
RRULE:FREQ=FORTNIGHTLY\r\n\
END:VEVENT\r\n";

    pub const FOOTBALL_WITH_REMINDER: &str = "BEGIN:VEVENT\r\n\
UID:football@example.com\r\n\
SUMMARY:Football match !!-1:00\r\n\
DTSTART;TZID=Europe/Paris:20240601T150000\r\n\
DTEND;TZID=Europe/Paris:20240601T170000\r\n\
END:VEVENT\r\n";

    pub const SAME_START_TWICE: &str = "BEGIN:VEVENT\r\n\
UID:dup-a@example.com\r\n\
SUMMARY:Duplicate\r\n\
DTSTART:20240605T090000Z\r\n\
DTEND:20240605T100000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:dup-b@example.com\r\n\
SUMMARY:Duplicate\r\n\
DTSTART:20240605T090000Z\r\n\
DTEND:20240605T100000Z\r\n\
END:VEVENT\r\n";

    pub const DAILY_OPEN_ENDED: &str = "BEGIN:VEVENT\r\n\
UID:daily@example.com\r\n\
SUMMARY:Daily review\r\n\
DTSTART;TZID=America/New_York:20240101T170000\r\n\
DTEND;TZID=America/New_York:20240101T173000\r\n\
RRULE:FREQ=DAILY\r\n\
END:VEVENT\r\n";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_documents_are_wrapped() {
        let document = ics::calendar(&[ics::DENTIST, ics::HOLIDAY]);
        assert!(document.starts_with("BEGIN:VCALENDAR"));
        assert!(document.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(document.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn test_fixture_dates_are_ordered() {
        assert!(dates::june_1_2024_morning() < dates::june_3_2024_after_standup());
    }
}
