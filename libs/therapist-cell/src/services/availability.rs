use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{TherapistAvailabilityEntry, TimeWindow};

/// A therapist's availability keyed by date.
///
/// Loaded from the embedded entry array and written back as a date-sorted
/// array, so bulk edits (copy, recurrence) never rescan the array per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityIndex {
    entries: BTreeMap<NaiveDate, Vec<TimeWindow>>,
}

impl AvailabilityIndex {
    /// The first entry for a date wins, matching `Therapist::slots_on`.
    pub fn from_entries(entries: &[TherapistAvailabilityEntry]) -> Self {
        let mut index = BTreeMap::new();
        for entry in entries {
            index.entry(entry.date).or_insert_with(|| entry.slots.clone());
        }
        Self { entries: index }
    }

    /// Replaces (or creates) the slot list for `date`.
    pub fn replace(&mut self, date: NaiveDate, slots: Vec<TimeWindow>) {
        self.entries.insert(date, slots);
    }

    pub fn to_entries(&self) -> Vec<TherapistAvailabilityEntry> {
        self.entries
            .iter()
            .map(|(date, slots)| TherapistAvailabilityEntry {
                date: *date,
                slots: slots.clone(),
            })
            .collect()
    }
}
