use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rrule::{RRule, RRuleSet, Unvalidated};

use super::EventService;
use crate::error::EventResult;
use crate::models::event::RawEventRecord;
use crate::models::occurrence::Occurrence;
use crate::utils::date;

mod parser;
mod utils;

use parser::{compile_error, find_until, parse_until, rewrite_until, strip_rule_prefix};
use utils::{enumerate_window, pair_series};

impl EventService {
    /// Expand a recurring record into the occurrences that touch the window.
    ///
    /// Starts and ends are enumerated as two series seeded at `DTSTART` and
    /// `DTEND`, then paired in order.
    pub(super) fn generate_occurrences(&self, record: &RawEventRecord) -> EventResult<Vec<Occurrence>> {
        let Some(rrule) = record.recurrence_rule.as_deref() else {
            return Ok(Vec::new());
        };
        let mut rule_text = strip_rule_prefix(rrule).to_string();

        if let Some(raw_until) = find_until(&rule_text) {
            match parse_until(raw_until) {
                Ok(until) => {
                    if until < self.window.long_past_cutoff().with_timezone(&Utc) {
                        log::debug!("Recurring event '{}' ended long ago", record.display_name());
                        return Ok(Vec::new());
                    }
                    rule_text = rewrite_until(&rule_text, until);
                }
                Err(err) => {
                    log::debug!("Unreadable UNTIL in '{}': {}", record.display_name(), err);
                }
            }
        }

        let (start, end) = self.resolve_bounds(record)?;

        let mut start_rules = compile(&rule_text, start.instant)?;
        let mut end_rules = compile(&rule_text, end)?;

        for exclusion in self.resolve_exclusions(record)? {
            start_rules = start_rules.exdate(exclusion.with_timezone(&rrule::Tz::Tz(start.instant.timezone())));
            end_rules = end_rules.exdate(exclusion.with_timezone(&rrule::Tz::Tz(end.timezone())));
        }

        let from = self.window.lookback_start()?;
        let to = self.window.to;

        let starts = enumerate_window(&start_rules, from, to, start.instant.timezone());
        if starts.is_empty() {
            log::debug!("No instances of '{}' in window", record.display_name());
            return Ok(Vec::new());
        }
        let ends = enumerate_window(&end_rules, from, to, end.timezone());

        Ok(pair_series(starts, ends)
            .into_iter()
            .filter_map(|(start_instant, end_instant)| {
                self.build_occurrence(start_instant, end_instant, start.is_all_day, record)
            })
            .collect())
    }

    /// Every `EXDATE` value, normalized with the default zone.
    fn resolve_exclusions(&self, record: &RawEventRecord) -> EventResult<Vec<DateTime<Tz>>> {
        let mut exclusions = Vec::new();

        for property in &record.exclusions {
            for timestamp in property.parse()?.values() {
                exclusions.push(date::normalize_timestamp(timestamp, self.fallback_zone())?.instant);
            }
        }

        Ok(exclusions)
    }
}

/// Compile the rule text into a generator seeded at `seed`.
fn compile(rule_text: &str, seed: DateTime<Tz>) -> EventResult<RRuleSet> {
    let rule: RRule<Unvalidated> = rule_text.parse().map_err(compile_error)?;
    let seed = seed.with_timezone(&rrule::Tz::Tz(seed.timezone()));
    rule.build(seed).map_err(compile_error)
}
