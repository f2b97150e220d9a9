// Benchmark for recurrence expansion
// Measures parsing and expansion of daily and weekly rules across window sizes

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ical_agenda::services::event::{EventService, QueryWindow};
use ical_agenda::services::icalendar::import;

fn calendar(event_count: usize, rule: &str) -> String {
    let mut document = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n");
    for index in 0..event_count {
        document.push_str(&format!(
            "BEGIN:VEVENT\r\n\
UID:bench-{index}@example.com\r\n\
SUMMARY:Event {index}\r\n\
DTSTART;TZID=America/New_York:20240101T{hour:02}0000\r\n\
DTEND;TZID=America/New_York:20240101T{hour:02}3000\r\n\
RRULE:{rule}\r\n\
EXDATE;TZID=America/New_York:20240105T{hour:02}0000\r\n\
END:VEVENT\r\n",
            hour = index % 24,
        ));
    }
    document.push_str("END:VCALENDAR\r\n");
    document
}

fn service(days: u32) -> EventService {
    let tz = Tz::Europe__Paris;
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
    EventService::new(QueryWindow::starting_today(now, &tz, days).unwrap(), tz)
}

fn bench_daily_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("daily_expansion");
    let records = import::from_str(&calendar(20, "FREQ=DAILY")).unwrap();

    for days in [7u32, 30, 365].iter() {
        let service = service(*days);
        group.bench_with_input(BenchmarkId::from_parameter(days), days, |b, _| {
            b.iter(|| service.expand_events(black_box(&records)));
        });
    }

    group.finish();
}

fn bench_weekly_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("weekly_expansion");
    let records = import::from_str(&calendar(20, "FREQ=WEEKLY;BYDAY=MO,WE,FR")).unwrap();

    for days in [7u32, 30, 365].iter() {
        let service = service(*days);
        group.bench_with_input(BenchmarkId::from_parameter(days), days, |b, _| {
            b.iter(|| service.expand_events(black_box(&records)));
        });
    }

    group.finish();
}

fn bench_parse_and_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_expand");
    let service = service(30);

    for event_count in [10usize, 100, 500].iter() {
        let document = calendar(*event_count, "FREQ=DAILY");
        group.bench_with_input(
            BenchmarkId::from_parameter(event_count),
            &document,
            |b, document| {
                b.iter(|| {
                    let records = import::from_str(black_box(document)).unwrap();
                    service.expand_events(&records)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_daily_expansion,
    bench_weekly_expansion,
    bench_parse_and_expand
);
criterion_main!(benches);
