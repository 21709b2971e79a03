use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::TimeWindow;

const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Parses a stored time-of-day value.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

/// Roots both ends of `window` at `date`. `None` when either end is unparsable.
pub fn window_bounds(window: &TimeWindow, date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let from = parse_time_of_day(&window.from)?;
    let to = parse_time_of_day(&window.to)?;
    Some((date.and_time(from), date.and_time(to)))
}

/// True iff `outer` fully contains `inner` on `date`.
///
/// Unparsable times on either side make this false.
pub fn covers(outer: &TimeWindow, inner: &TimeWindow, date: NaiveDate) -> bool {
    match (window_bounds(outer, date), window_bounds(inner, date)) {
        (Some((outer_from, outer_to)), Some((inner_from, inner_to))) => {
            outer_from <= inner_from && outer_to >= inner_to
        }
        _ => false,
    }
}

pub fn is_valid(window: &TimeWindow) -> bool {
    match (parse_time_of_day(&window.from), parse_time_of_day(&window.to)) {
        (Some(from), Some(to)) => from < to,
        _ => false,
    }
}
