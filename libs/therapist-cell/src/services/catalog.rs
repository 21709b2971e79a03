use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use shared_database::{Collection, DocumentStore};

use crate::models::{CatalogEntry, TherapistError, TimeWindow};
use crate::services::interval;
use crate::services::recurrence::{RecurrenceExpander, SlotSchedule};

/// Universal timeslot catalog, one document per date.
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get_entry(&self, date: NaiveDate) -> Result<Option<CatalogEntry>, TherapistError> {
        let key = date.to_string();
        match self.store.find_one(Collection::UniversalTimeslots, &key).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Catalog windows for `date` in stored order. A missing entry is an empty list.
    pub async fn list_windows(&self, date: NaiveDate) -> Result<Vec<TimeWindow>, TherapistError> {
        let windows = self
            .get_entry(date)
            .await?
            .map(|entry| entry.slots)
            .unwrap_or_default();
        debug!("Catalog has {} windows on {}", windows.len(), date);
        Ok(windows)
    }

    /// Replaces the slot list for `date`. Every window must be well formed.
    pub async fn save_slots(
        &self,
        date: NaiveDate,
        slots: Vec<TimeWindow>,
    ) -> Result<CatalogEntry, TherapistError> {
        if let Some(bad) = slots.iter().find(|w| !interval::is_valid(w)) {
            return Err(TherapistError::InvalidInput(format!("Invalid time window {}", bad)));
        }

        let entry = CatalogEntry { date, slots };
        self.write_entry(&entry).await?;
        info!("Saved {} catalog windows for {}", entry.slots.len(), date);
        Ok(entry)
    }

    pub async fn copy_slots(
        &self,
        source: NaiveDate,
        targets: &[NaiveDate],
    ) -> Result<usize, TherapistError> {
        let schedule = CatalogSchedule::new(self.store.clone());
        RecurrenceExpander::new().copy_to(&schedule, source, targets).await
    }

    pub async fn apply_recurring(
        &self,
        source: NaiveDate,
        weekday_names: &[String],
        today: NaiveDate,
    ) -> Result<usize, TherapistError> {
        let schedule = CatalogSchedule::new(self.store.clone());
        RecurrenceExpander::new()
            .apply_recurring(&schedule, source, weekday_names, today)
            .await
    }

    async fn write_entry(&self, entry: &CatalogEntry) -> Result<(), TherapistError> {
        let key = entry.date.to_string();
        self.store
            .save(Collection::UniversalTimeslots, &key, serde_json::to_value(entry)?)
            .await?;
        Ok(())
    }
}

/// Catalog as a recurrence target.
///
/// Each date is its own document, so writes are applied one date at a time
/// and stop at the first failure; dates already written stay written.
pub struct CatalogSchedule {
    catalog: CatalogService,
}

impl CatalogSchedule {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            catalog: CatalogService::new(store),
        }
    }
}

#[async_trait]
impl SlotSchedule for CatalogSchedule {
    async fn slots_for(&self, date: NaiveDate) -> Result<Vec<TimeWindow>, TherapistError> {
        self.catalog.list_windows(date).await
    }

    async fn replace_slots(&self, dates: &[NaiveDate], slots: &[TimeWindow]) -> Result<(), TherapistError> {
        for date in dates {
            let entry = CatalogEntry {
                date: *date,
                slots: slots.to_vec(),
            };
            self.catalog.write_entry(&entry).await?;
        }
        Ok(())
    }
}
