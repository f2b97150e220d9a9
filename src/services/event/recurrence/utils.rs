use chrono::DateTime;
use chrono_tz::Tz;
use rrule::RRuleSet;

/// Instances in `[from, to)`, ascending, in `tz`.
///
/// Walks the generator until it passes `to`; the window bounds the work, so
/// dense rules are never truncated.
pub(super) fn enumerate_window(
    rules: &RRuleSet,
    from: DateTime<Tz>,
    to: DateTime<Tz>,
    tz: Tz,
) -> Vec<DateTime<Tz>> {
    rules
        .into_iter()
        .map(|date| date.with_timezone(&tz))
        .take_while(|date| *date < to)
        .filter(|date| *date >= from)
        .collect()
}

/// Pair the k-th start with the k-th end.
///
/// Starts left without an end are dropped.
pub(super) fn pair_series(
    starts: Vec<DateTime<Tz>>,
    ends: Vec<DateTime<Tz>>,
) -> Vec<(DateTime<Tz>, DateTime<Tz>)> {
    if starts.len() > ends.len() {
        log::debug!(
            "Dropping {} start(s) without a matching end",
            starts.len() - ends.len()
        );
    }

    starts.into_iter().zip(ends).collect()
}
