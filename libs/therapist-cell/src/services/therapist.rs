use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{Collection, DocumentStore};
use shared_models::auth::User;

use crate::models::{
    CreateTherapistRequest, Therapist, TherapistAvailabilityEntry, TherapistError, TimeWindow,
    UpdateTherapistRequest,
};
use crate::services::availability::AvailabilityIndex;
use crate::services::interval;
use crate::services::recurrence::{RecurrenceExpander, SlotSchedule};

pub struct TherapistService {
    store: Arc<dyn DocumentStore>,
}

impl TherapistService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create the therapist profile owned by an expert account
    pub async fn create_therapist(
        &self,
        account_id: &str,
        request: CreateTherapistRequest,
    ) -> Result<Therapist, TherapistError> {
        debug!("Creating therapist profile for account: {}", account_id);

        if request.name.trim().is_empty() {
            return Err(TherapistError::InvalidInput("Therapist name is required".to_string()));
        }

        let existing = self.list_therapists().await?;
        if existing.iter().any(|t| t.account_id == account_id) {
            return Err(TherapistError::AlreadyExists);
        }

        let now = Utc::now();
        let therapist = Therapist {
            id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            name: request.name.trim().to_string(),
            about: request.about,
            photo: request.photo,
            expertise: request.expertise,
            supported_modes: request.supported_modes,
            availability: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.save_therapist(&therapist).await?;
        info!("Therapist {} created for account {}", therapist.id, account_id);
        Ok(therapist)
    }

    pub async fn get_therapist(&self, therapist_id: Uuid) -> Result<Therapist, TherapistError> {
        let doc = self
            .store
            .find_one(Collection::Therapists, &therapist_id.to_string())
            .await?
            .ok_or(TherapistError::TherapistNotFound)?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Full therapist scan. Documents that fail to decode are skipped.
    pub async fn list_therapists(&self) -> Result<Vec<Therapist>, TherapistError> {
        let docs = self.store.find(Collection::Therapists).await?;
        let therapists: Vec<Therapist> = docs
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<Therapist>(doc) {
                Ok(therapist) => Some(therapist),
                Err(e) => {
                    warn!("Skipping undecodable therapist document: {}", e);
                    None
                }
            })
            .collect();

        debug!("Loaded {} therapists", therapists.len());
        Ok(therapists)
    }

    pub async fn update_therapist(
        &self,
        therapist_id: Uuid,
        request: UpdateTherapistRequest,
    ) -> Result<Therapist, TherapistError> {
        let mut therapist = self.get_therapist(therapist_id).await?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(TherapistError::InvalidInput("Therapist name is required".to_string()));
            }
            therapist.name = name.trim().to_string();
        }
        if let Some(about) = request.about {
            therapist.about = Some(about);
        }
        if let Some(photo) = request.photo {
            therapist.photo = Some(photo);
        }
        if let Some(expertise) = request.expertise {
            therapist.expertise = expertise;
        }
        if let Some(modes) = request.supported_modes {
            therapist.supported_modes = modes;
        }
        therapist.updated_at = Utc::now();

        self.save_therapist(&therapist).await?;
        Ok(therapist)
    }

    /// Owners may edit their own profile; administrators may edit any.
    pub fn ensure_can_edit(&self, user: &User, therapist: &Therapist) -> Result<(), TherapistError> {
        if user.is_admin() || (user.is_expert() && therapist.account_id == user.id) {
            Ok(())
        } else {
            warn!("User {} may not edit therapist {}", user.id, therapist.id);
            Err(TherapistError::Forbidden)
        }
    }

    /// Offered windows on `date`, empty when the therapist has no entry for it.
    pub async fn get_availability(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TimeWindow>, TherapistError> {
        let therapist = self.get_therapist(therapist_id).await?;
        Ok(therapist.slots_on(date).map(<[TimeWindow]>::to_vec).unwrap_or_default())
    }

    pub async fn save_availability(
        &self,
        therapist_id: Uuid,
        date: NaiveDate,
        slots: Vec<TimeWindow>,
    ) -> Result<TherapistAvailabilityEntry, TherapistError> {
        if let Some(bad) = slots.iter().find(|w| !interval::is_valid(w)) {
            return Err(TherapistError::InvalidInput(format!("Invalid time window {}", bad)));
        }

        let schedule = TherapistSchedule::new(self.store.clone(), therapist_id);
        schedule.replace_slots(&[date], &slots).await?;
        Ok(TherapistAvailabilityEntry { date, slots })
    }

    pub async fn copy_availability(
        &self,
        therapist_id: Uuid,
        source: NaiveDate,
        targets: &[NaiveDate],
    ) -> Result<usize, TherapistError> {
        let schedule = TherapistSchedule::new(self.store.clone(), therapist_id);
        RecurrenceExpander::new().copy_to(&schedule, source, targets).await
    }

    pub async fn apply_recurring_availability(
        &self,
        therapist_id: Uuid,
        source: NaiveDate,
        weekday_names: &[String],
        today: NaiveDate,
    ) -> Result<usize, TherapistError> {
        let schedule = TherapistSchedule::new(self.store.clone(), therapist_id);
        RecurrenceExpander::new()
            .apply_recurring(&schedule, source, weekday_names, today)
            .await
    }

    async fn save_therapist(&self, therapist: &Therapist) -> Result<(), TherapistError> {
        self.store
            .save(
                Collection::Therapists,
                &therapist.id.to_string(),
                serde_json::to_value(therapist)?,
            )
            .await?;
        Ok(())
    }
}

/// One therapist's availability as a recurrence target.
///
/// All dates are applied to the in-memory index and persisted with a single
/// document write, so a batch either lands completely or not at all.
pub struct TherapistSchedule {
    therapists: TherapistService,
    therapist_id: Uuid,
}

impl TherapistSchedule {
    pub fn new(store: Arc<dyn DocumentStore>, therapist_id: Uuid) -> Self {
        Self {
            therapists: TherapistService::new(store),
            therapist_id,
        }
    }
}

#[async_trait]
impl SlotSchedule for TherapistSchedule {
    async fn slots_for(&self, date: NaiveDate) -> Result<Vec<TimeWindow>, TherapistError> {
        self.therapists.get_availability(self.therapist_id, date).await
    }

    async fn replace_slots(&self, dates: &[NaiveDate], slots: &[TimeWindow]) -> Result<(), TherapistError> {
        let mut therapist = self.therapists.get_therapist(self.therapist_id).await?;
        let mut index = AvailabilityIndex::from_entries(&therapist.availability);

        for date in dates {
            index.replace(*date, slots.to_vec());
        }

        therapist.availability = index.to_entries();
        therapist.updated_at = Utc::now();
        self.therapists.save_therapist(&therapist).await?;

        debug!(
            "Therapist {} availability now spans {} dates",
            self.therapist_id,
            therapist.availability.len()
        );
        Ok(())
    }
}
