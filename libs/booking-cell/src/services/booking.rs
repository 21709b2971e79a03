use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{Collection, DocumentStore};
use shared_models::auth::User;
use therapist_cell::models::{MatchRequest, SessionMode, Therapist, TimeWindow};
use therapist_cell::services::{AssignmentPolicy, AvailabilityResolver, UniformRandomPolicy};

use crate::models::{
    Booking, BookingError, BookingStatus, CreateBookingRequest, RescheduleBookingRequest,
};
use crate::services::lifecycle::BookingLifecycleService;

pub struct BookingService {
    store: Arc<dyn DocumentStore>,
    resolver: AvailabilityResolver,
    policy: Arc<dyn AssignmentPolicy>,
    lifecycle_service: BookingLifecycleService,
}

impl BookingService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_policy(store, Arc::new(UniformRandomPolicy))
    }

    pub fn with_policy(store: Arc<dyn DocumentStore>, policy: Arc<dyn AssignmentPolicy>) -> Self {
        Self {
            resolver: AvailabilityResolver::new(store.clone()),
            store,
            policy,
            lifecycle_service: BookingLifecycleService::new(),
        }
    }

    /// Match the requested window against every therapist's availability,
    /// assign one qualifying therapist and persist the booking as PENDING.
    ///
    /// The chosen therapist's availability is not consumed and nothing is
    /// re-checked at write time, so two concurrent bookings can land on the
    /// same therapist and window.
    pub async fn create_booking(
        &self,
        client_id: &str,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        debug!(
            "Creating booking for client {} on {} {}",
            client_id, request.date, request.timeslot
        );

        if request.therapies.is_empty() {
            return Err(BookingError::ValidationError(
                "At least one therapy must be selected".to_string(),
            ));
        }

        let names: Vec<String> = request.therapies.iter().map(|t| t.name.clone()).collect();
        let therapist = self
            .assign_therapist(request.date, request.mode, &request.timeslot, names)
            .await?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            client_id: client_id.to_string(),
            date: request.date,
            timeslot: request.timeslot,
            mode: request.mode,
            therapies: request.therapies,
            therapist_id: therapist.id,
            therapist_name: therapist.name,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.save_booking(&booking).await?;
        info!(
            "Booking {} created for client {} with therapist {}",
            booking.id, client_id, booking.therapist_id
        );
        Ok(booking)
    }

    /// Bookings are visible to the client that made them and to administrators.
    pub async fn get_booking(&self, booking_id: Uuid, user: &User) -> Result<Booking, BookingError> {
        let booking = self.load_booking(booking_id).await?;
        self.ensure_can_access(user, &booking)?;
        Ok(booking)
    }

    pub async fn list_bookings(&self, user: &User) -> Result<Vec<Booking>, BookingError> {
        let docs = self.store.find(Collection::Bookings).await?;
        let mut bookings: Vec<Booking> = docs
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<Booking>(doc) {
                Ok(booking) => Some(booking),
                Err(e) => {
                    warn!("Skipping undecodable booking document: {}", e);
                    None
                }
            })
            .filter(|booking| user.is_admin() || booking.client_id == user.id)
            .collect();

        bookings.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.timeslot.from.cmp(&b.timeslot.from))
        });

        debug!("Listed {} bookings for user {}", bookings.len(), user.id);
        Ok(bookings)
    }

    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let mut booking = self.load_booking(booking_id).await?;

        self.lifecycle_service
            .validate_status_transition(booking.status, new_status)?;

        booking.status = new_status;
        booking.updated_at = Utc::now();
        self.save_booking(&booking).await?;

        info!("Booking {} moved to {}", booking.id, new_status);
        Ok(booking)
    }

    /// Move a booking to a new date and window, re-running matching with the
    /// booking's mode and therapies. The booking is reassigned even when the
    /// current therapist would still qualify.
    pub async fn reschedule(
        &self,
        booking_id: Uuid,
        user: &User,
        request: RescheduleBookingRequest,
    ) -> Result<Booking, BookingError> {
        let mut booking = self.load_booking(booking_id).await?;
        self.ensure_can_access(user, &booking)?;

        if !self.lifecycle_service.can_reschedule(booking.status) {
            return Err(BookingError::ValidationError(format!(
                "Booking cannot be rescheduled in status {}",
                booking.status
            )));
        }

        let therapist = self
            .assign_therapist(request.date, booking.mode, &request.timeslot, booking.therapy_names())
            .await?;

        booking.date = request.date;
        booking.timeslot = request.timeslot;
        booking.therapist_id = therapist.id;
        booking.therapist_name = therapist.name;
        booking.updated_at = Utc::now();

        self.save_booking(&booking).await?;
        info!(
            "Booking {} rescheduled to {} {} with therapist {}",
            booking.id, booking.date, booking.timeslot, booking.therapist_id
        );
        Ok(booking)
    }

    async fn assign_therapist(
        &self,
        date: NaiveDate,
        mode: SessionMode,
        window: &TimeWindow,
        therapy_names: Vec<String>,
    ) -> Result<Therapist, BookingError> {
        let request = MatchRequest {
            date,
            mode,
            window: window.clone(),
            therapy_names,
        };

        let candidates = self.resolver.find_qualifying_therapists(&request).await?;
        match self.policy.choose(&candidates) {
            Some(therapist) => Ok(therapist.clone()),
            None => {
                warn!("No qualifying therapist for {} {} on {}", mode, window, date);
                Err(BookingError::NoQualifyingTherapist)
            }
        }
    }

    fn ensure_can_access(&self, user: &User, booking: &Booking) -> Result<(), BookingError> {
        if user.is_admin() || booking.client_id == user.id {
            Ok(())
        } else {
            warn!("User {} may not access booking {}", user.id, booking.id);
            Err(BookingError::Unauthorized)
        }
    }

    async fn load_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let doc = self
            .store
            .find_one(Collection::Bookings, &booking_id.to_string())
            .await?
            .ok_or(BookingError::NotFound)?;
        Ok(serde_json::from_value(doc)?)
    }

    async fn save_booking(&self, booking: &Booking) -> Result<(), BookingError> {
        let doc = serde_json::to_value(booking)?;
        self.store
            .save(Collection::Bookings, &booking.id.to_string(), doc)
            .await?;
        Ok(())
    }
}
