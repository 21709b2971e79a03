use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate, Weekday};
use tracing::{debug, info};

use crate::models::{TherapistError, TimeWindow};

/// Recurring edits reach from today through today plus this many months.
pub const RECURRENCE_HORIZON_MONTHS: u32 = 12;

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("Monday", Weekday::Mon),
    ("Tuesday", Weekday::Tue),
    ("Wednesday", Weekday::Wed),
    ("Thursday", Weekday::Thu),
    ("Friday", Weekday::Fri),
    ("Saturday", Weekday::Sat),
    ("Sunday", Weekday::Sun),
];

/// A per-date slot collection that recurrence and copy edits write into.
///
/// Implemented for the universal catalog and for a single therapist's
/// availability.
#[async_trait]
pub trait SlotSchedule: Send + Sync {
    /// Slots stored for `date`, empty when there is no entry.
    async fn slots_for(&self, date: NaiveDate) -> Result<Vec<TimeWindow>, TherapistError>;

    /// Replaces the slot list of every date in `dates` with `slots`.
    async fn replace_slots(&self, dates: &[NaiveDate], slots: &[TimeWindow]) -> Result<(), TherapistError>;
}

/// Parses canonical English weekday names. Matching is exact.
pub fn parse_weekday_names(names: &[String]) -> Result<HashSet<Weekday>, TherapistError> {
    names
        .iter()
        .map(|name| {
            WEEKDAY_NAMES
                .iter()
                .find(|(canonical, _)| canonical == name)
                .map(|(_, weekday)| *weekday)
                .ok_or_else(|| TherapistError::InvalidInput(format!("Unknown weekday '{}'", name)))
        })
        .collect()
}

/// Every date in `[today, today + horizon]` falling on one of `weekdays`.
pub fn recurring_dates(today: NaiveDate, weekdays: &HashSet<Weekday>) -> Vec<NaiveDate> {
    if weekdays.is_empty() {
        return Vec::new();
    }

    let horizon = today
        .checked_add_months(Months::new(RECURRENCE_HORIZON_MONTHS))
        .unwrap_or(NaiveDate::MAX);

    today
        .iter_days()
        .take_while(|date| *date <= horizon)
        .filter(|date| weekdays.contains(&date.weekday()))
        .collect()
}

/// Projects one date's slot list onto other dates. Targets are replaced,
/// never merged, so repeating an edit leaves the same state.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecurrenceExpander;

impl RecurrenceExpander {
    pub fn new() -> Self {
        Self
    }

    /// Copies the slots of `source` onto each of `targets`. Returns the number of dates written.
    pub async fn copy_to<S>(
        &self,
        schedule: &S,
        source: NaiveDate,
        targets: &[NaiveDate],
    ) -> Result<usize, TherapistError>
    where
        S: SlotSchedule + ?Sized,
    {
        let targets: Vec<NaiveDate> = targets
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if targets.is_empty() {
            return Err(TherapistError::InvalidInput("At least one target date is required".to_string()));
        }

        let slots = schedule.slots_for(source).await?;
        debug!("Copying {} slots from {} to {} dates", slots.len(), source, targets.len());

        schedule.replace_slots(&targets, &slots).await?;
        Ok(targets.len())
    }

    /// Copies the slots of `source` onto every matching weekday within the horizon.
    pub async fn apply_recurring<S>(
        &self,
        schedule: &S,
        source: NaiveDate,
        weekday_names: &[String],
        today: NaiveDate,
    ) -> Result<usize, TherapistError>
    where
        S: SlotSchedule + ?Sized,
    {
        let weekdays = parse_weekday_names(weekday_names)?;
        if weekdays.is_empty() {
            return Err(TherapistError::InvalidInput("At least one weekday is required".to_string()));
        }

        let dates = recurring_dates(today, &weekdays);
        let slots = schedule.slots_for(source).await?;

        schedule.replace_slots(&dates, &slots).await?;
        info!("Applied {} slots from {} to {} recurring dates", slots.len(), source, dates.len());
        Ok(dates.len())
    }
}
