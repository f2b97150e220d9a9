// Property-based tests for recurrence expansion
// Random rules and windows; the published list must respect the window

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;

use ical_agenda::models::event::{DateProperty, RawEventRecord};
use ical_agenda::services::event::{EventService, QueryWindow};
use ical_agenda::services::event::queries;

const ZONES: [Tz; 4] = [
    Tz::UTC,
    Tz::Europe__Paris,
    Tz::America__New_York,
    Tz::Australia__Sydney,
];

const FREQUENCIES: [&str; 4] = ["DAILY", "WEEKLY", "MONTHLY", "YEARLY"];

fn recurring_record(start: &str, minutes: i64, tzid: &str, rule: String) -> RawEventRecord {
    let start_property = DateProperty::new(start).with_tzid(tzid);
    let naive_start = chrono::NaiveDateTime::parse_from_str(start, "%Y%m%dT%H%M%S").unwrap();
    let end = (naive_start + Duration::minutes(minutes)).format("%Y%m%dT%H%M%S").to_string();

    RawEventRecord::builder()
        .summary("Generated")
        .start(start_property)
        .end(DateProperty::new(end).with_tzid(tzid))
        .recurrence_rule(rule)
        .build()
}

fn window_for(now: DateTime<Utc>, tz: Tz, days: u32) -> QueryWindow {
    QueryWindow::starting_today(now, &tz, days).unwrap()
}

proptest! {
    /// Property: every occurrence overlapping a query window lies inside it
    #[test]
    fn prop_overlapping_results_touch_window(
        zone in 0..ZONES.len(),
        frequency in 0..FREQUENCIES.len(),
        interval in 1..4u32,
        day in 1..=28u32,
        hour in 0..24u32,
        minutes in 0..(3 * 24 * 60i64),
        query_offset_hours in 0..(20 * 24i64),
        query_length_hours in 0..(10 * 24i64),
    ) {
        let tz = ZONES[zone];
        let start = format!("202406{:02}T{:02}0000", day, hour);
        let rule = format!("FREQ={};INTERVAL={}", FREQUENCIES[frequency], interval);
        let record = recurring_record(&start, minutes, tz.name(), rule);

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let window = window_for(now, tz, 30);
        let occurrences = EventService::new(window, tz).expand_events(&[record]);

        let query_start = window.from + Duration::hours(query_offset_hours);
        let query_end = query_start + Duration::hours(query_length_hours);

        for occurrence in queries::overlapping(&occurrences, query_start, query_end) {
            prop_assert!(occurrence.start < query_end);
            prop_assert!(occurrence.end > query_start);
        }
    }

    /// Property: expansion output is sorted, within the window, and never
    /// ends before the window's first day
    #[test]
    fn prop_expansion_respects_window(
        zone in 0..ZONES.len(),
        frequency in 0..FREQUENCIES.len(),
        day in 1..=28u32,
        hour in 0..24u32,
        minutes in 0..(2 * 24 * 60i64),
        days in 1..60u32,
    ) {
        let tz = ZONES[zone];
        let start = format!("202406{:02}T{:02}0000", day, hour);
        let rule = format!("FREQ={}", FREQUENCIES[frequency]);
        let record = recurring_record(&start, minutes, tz.name(), rule);

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let window = window_for(now, tz, days);
        let occurrences = EventService::new(window, tz).expand_events(&[record]);

        prop_assert!(occurrences.windows(2).all(|pair| pair[0].start <= pair[1].start));
        for occurrence in &occurrences {
            prop_assert!(occurrence.start < window.to);
            prop_assert!(occurrence.start >= window.from);
            prop_assert!(occurrence.end.date_naive() >= window.from.date_naive());
            prop_assert_eq!(occurrence.duration(), Duration::minutes(minutes));
        }
    }

    /// Property: the next occurrence is the earliest one still running
    #[test]
    fn prop_next_after_is_earliest_unfinished(
        day in 1..=28u32,
        hour in 0..24u32,
        now_offset_hours in 0..(30 * 24i64),
    ) {
        let tz = Tz::Europe__Paris;
        let start = format!("202406{:02}T{:02}0000", day, hour);
        let record = recurring_record(&start, 90, tz.name(), "FREQ=DAILY".to_string());

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let window = window_for(now, tz, 30);
        let occurrences = EventService::new(window, tz).expand_events(&[record]);

        let at = window.from + Duration::hours(now_offset_hours);
        let expected = occurrences
            .iter()
            .filter(|occurrence| occurrence.end > at)
            .map(|occurrence| occurrence.start)
            .min();

        prop_assert_eq!(queries::next_after(&occurrences, at).map(|o| o.start), expected);
    }
}
