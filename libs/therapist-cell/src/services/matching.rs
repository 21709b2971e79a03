use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use shared_database::DocumentStore;

use crate::models::{
    AnnotatedWindow, AvailabilityQuery, MatchRequest, SessionMode, Therapist, TherapistError,
    TimeWindow,
};
use crate::services::catalog::CatalogService;
use crate::services::interval;
use crate::services::therapist::TherapistService;

/// True iff `therapist` can take `request`: the mode is supported, there is
/// an availability entry for the date, one of its windows covers the
/// requested window, and the expertise names intersect.
pub fn qualifies(therapist: &Therapist, request: &MatchRequest) -> bool {
    therapist.supports_mode(request.mode)
        && therapist.has_expertise_in(&request.therapy_names)
        && offers_window(therapist, request.date, &request.window)
}

fn offers_window(therapist: &Therapist, date: NaiveDate, window: &TimeWindow) -> bool {
    therapist
        .slots_on(date)
        .map(|slots| slots.iter().any(|slot| interval::covers(slot, window, date)))
        .unwrap_or(false)
}

/// Annotates catalog windows in their stored order.
///
/// Mode and expertise do not depend on the window, so those checks run once
/// per therapist. Malformed catalog windows stay in the output with
/// `has_expert: false`.
pub fn annotate_windows(
    windows: Vec<TimeWindow>,
    therapists: &[Therapist],
    date: NaiveDate,
    mode: SessionMode,
    therapy_names: &[String],
) -> Vec<AnnotatedWindow> {
    let eligible: Vec<&Therapist> = therapists
        .iter()
        .filter(|t| t.supports_mode(mode) && t.has_expertise_in(therapy_names))
        .collect();

    windows
        .into_iter()
        .map(|window| {
            let has_expert = interval::is_valid(&window)
                && eligible.iter().any(|t| offers_window(t, date, &window));
            AnnotatedWindow {
                window,
                has_expert: Some(has_expert),
            }
        })
        .collect()
}

/// Answers availability queries by intersecting the universal catalog with
/// every therapist's offered windows. Nothing is cached between calls.
pub struct AvailabilityResolver {
    catalog: CatalogService,
    therapists: TherapistService,
}

impl AvailabilityResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            therapists: TherapistService::new(store),
        }
    }

    pub async fn list_catalog_windows(&self, date: NaiveDate) -> Result<Vec<TimeWindow>, TherapistError> {
        self.catalog.list_windows(date).await
    }

    /// Catalog windows for the query date, annotated with `has_expert` when
    /// both mode and therapy names are given.
    pub async fn annotate_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<AnnotatedWindow>, TherapistError> {
        let date = query
            .date
            .ok_or_else(|| TherapistError::InvalidInput("date is required".to_string()))?;

        let windows = self.catalog.list_windows(date).await?;

        let (mode, therapy_names) = match (query.mode, query.therapy_names.as_deref()) {
            (Some(mode), Some(names)) => (mode, names),
            _ => {
                debug!("Browse-only availability for {}", date);
                return Ok(windows
                    .into_iter()
                    .map(|window| AnnotatedWindow { window, has_expert: None })
                    .collect());
            }
        };

        let therapists = self.therapists.list_therapists().await?;
        let annotated = annotate_windows(windows, &therapists, date, mode, therapy_names);

        info!(
            "{} of {} windows on {} have an expert for {} {:?}",
            annotated.iter().filter(|w| w.has_expert == Some(true)).count(),
            annotated.len(),
            date,
            mode,
            therapy_names
        );
        Ok(annotated)
    }

    /// Therapists qualifying for `request`. An empty result is not an error.
    pub async fn find_qualifying_therapists(
        &self,
        request: &MatchRequest,
    ) -> Result<Vec<Therapist>, TherapistError> {
        if !interval::is_valid(&request.window) {
            return Err(TherapistError::InvalidInput(format!(
                "Invalid time window {}",
                request.window
            )));
        }

        let candidates: Vec<Therapist> = self
            .therapists
            .list_therapists()
            .await?
            .into_iter()
            .filter(|t| qualifies(t, request))
            .collect();

        debug!(
            "{} therapists qualify for {} {} on {}",
            candidates.len(),
            request.mode,
            request.window,
            request.date
        );
        Ok(candidates)
    }
}
