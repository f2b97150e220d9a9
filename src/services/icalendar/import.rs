use std::io::BufReader;

use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use ical::IcalParser;

use crate::error::DocumentParseError;
use crate::models::event::{DateProperty, RawEventRecord};

use super::utils::unescape_text;

/// Extract every VEVENT of every VCALENDAR in the document.
///
/// Only a broken document root is an error; odd property values are kept
/// verbatim and judged later, per event.
pub fn from_str(ics_content: &str) -> Result<Vec<RawEventRecord>, DocumentParseError> {
    if !ics_content.contains("BEGIN:VCALENDAR") {
        return Err(DocumentParseError::MissingCalendar);
    }

    let parser = IcalParser::new(BufReader::new(ics_content.as_bytes()));
    let mut records = Vec::new();

    for calendar in parser {
        let calendar = calendar.map_err(|err| DocumentParseError::Malformed(err.to_string()))?;
        records.extend(calendar.events.iter().map(record_from_event));
    }

    log::debug!("Extracted {} VEVENT records", records.len());
    Ok(records)
}

fn record_from_event(event: &IcalEvent) -> RawEventRecord {
    let mut record = RawEventRecord::default();

    for property in &event.properties {
        let Some(value) = property.value.as_deref() else {
            continue;
        };

        match property.name.to_ascii_uppercase().as_str() {
            "UID" => record.uid = Some(value.trim().to_string()),
            "SUMMARY" => record.summary = Some(unescape_text(value)),
            "DESCRIPTION" => record.description = Some(unescape_text(value)),
            "LOCATION" => record.location = Some(unescape_text(value)),
            "DTSTART" => record.start = Some(date_property(property, value)),
            "DTEND" => record.end = Some(date_property(property, value)),
            "RRULE" => record.recurrence_rule = Some(value.trim().to_string()),
            "EXDATE" => record.exclusions.push(date_property(property, value)),
            _ => {}
        }
    }

    record
}

fn date_property(property: &Property, value: &str) -> DateProperty {
    let mut date_property = DateProperty::new(value.trim());

    if let Some(tzid) = param_value(property, "TZID") {
        date_property = date_property.with_tzid(tzid);
    }

    if param_value(property, "VALUE").is_some_and(|kind| kind.eq_ignore_ascii_case("DATE")) {
        date_property = date_property.date_only();
    }

    date_property
}

fn param_value<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|value| value.trim_matches('"'))
}
