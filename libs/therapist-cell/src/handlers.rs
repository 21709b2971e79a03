use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{require_admin, ValidJson};

use crate::models::{
    AvailabilityQuery, CopySlotsRequest, CreateTherapistRequest, MatchRequest,
    RecurringSlotsRequest, SaveSlotsRequest, SessionMode, UpdateTherapistRequest,
};
use crate::services::{AvailabilityResolver, CatalogService, TherapistService};

#[derive(Debug, Deserialize)]
pub struct TimeslotQuery {
    pub date: Option<String>,
    pub mode: Option<String>,
    /// Comma separated therapy names.
    pub therapies: Option<String>,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

fn parse_therapist_id(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|_| AppError::ValidationError(format!("Invalid therapist id '{}'", value)))
}

fn parse_therapy_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_timeslots(
    State(state): State<AppState>,
    Query(query): Query<TimeslotQuery>,
) -> Result<Json<Value>, AppError> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => return Err(AppError::ValidationError("date is required".to_string())),
    };
    let mode = query
        .mode
        .as_deref()
        .map(str::parse::<SessionMode>)
        .transpose()?;

    let availability_query = AvailabilityQuery {
        date: Some(date),
        mode,
        therapy_names: query.therapies.as_deref().map(parse_therapy_names),
    };

    let resolver = AvailabilityResolver::new(state.store.clone());
    let slots = resolver.annotate_availability(&availability_query).await?;

    Ok(Json(json!({
        "date": date,
        "slots": slots,
    })))
}

#[axum::debug_handler]
pub async fn list_therapists(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let therapists = TherapistService::new(state.store.clone()).list_therapists().await?;

    Ok(Json(json!({
        "therapists": therapists,
        "total": therapists.len()
    })))
}

#[axum::debug_handler]
pub async fn get_therapist(
    State(state): State<AppState>,
    Path(therapist_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let therapist_id = parse_therapist_id(&therapist_id)?;
    let therapist = TherapistService::new(state.store.clone())
        .get_therapist(therapist_id)
        .await?;

    Ok(Json(json!(therapist)))
}

#[axum::debug_handler]
pub async fn get_therapist_availability(
    State(state): State<AppState>,
    Path((therapist_id, date)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let therapist_id = parse_therapist_id(&therapist_id)?;
    let date = parse_date(&date)?;

    let slots = TherapistService::new(state.store.clone())
        .get_availability(therapist_id, date)
        .await?;

    Ok(Json(json!({
        "therapist_id": therapist_id,
        "date": date,
        "slots": slots
    })))
}

// ==============================================================================
// ADMIN CATALOG HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn search_candidates(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ValidJson(request): ValidJson<MatchRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let resolver = AvailabilityResolver::new(state.store.clone());
    let therapists = resolver.find_qualifying_therapists(&request).await?;

    Ok(Json(json!({
        "therapists": therapists,
        "total": therapists.len()
    })))
}

#[axum::debug_handler]
pub async fn save_timeslots(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(date): Path<String>,
    ValidJson(request): ValidJson<SaveSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let date = parse_date(&date)?;

    let entry = CatalogService::new(state.store.clone())
        .save_slots(date, request.slots)
        .await?;

    Ok(Json(json!(entry)))
}

#[axum::debug_handler]
pub async fn copy_timeslots(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(date): Path<String>,
    ValidJson(request): ValidJson<CopySlotsRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let source = parse_date(&date)?;

    let written = CatalogService::new(state.store.clone())
        .copy_slots(source, &request.target_dates)
        .await?;

    Ok(Json(json!({
        "success": true,
        "source_date": source,
        "dates_updated": written
    })))
}

#[axum::debug_handler]
pub async fn recurring_timeslots(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(date): Path<String>,
    ValidJson(request): ValidJson<RecurringSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let source = parse_date(&date)?;

    let written = CatalogService::new(state.store.clone())
        .apply_recurring(source, &request.weekdays, Utc::now().date_naive())
        .await?;

    Ok(Json(json!({
        "success": true,
        "source_date": source,
        "dates_updated": written
    })))
}

// ==============================================================================
// THERAPIST PROFILE & AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_therapist(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ValidJson(request): ValidJson<CreateTherapistRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_expert() {
        return Err(AppError::Forbidden("Only expert accounts can create therapist profiles".to_string()));
    }

    let therapist = TherapistService::new(state.store.clone())
        .create_therapist(&user.id, request)
        .await?;

    Ok(Json(json!(therapist)))
}

#[axum::debug_handler]
pub async fn update_therapist(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(therapist_id): Path<String>,
    ValidJson(request): ValidJson<UpdateTherapistRequest>,
) -> Result<Json<Value>, AppError> {
    let therapist_id = parse_therapist_id(&therapist_id)?;
    let service = TherapistService::new(state.store.clone());

    let therapist = service.get_therapist(therapist_id).await?;
    service.ensure_can_edit(&user, &therapist)?;

    let updated = service.update_therapist(therapist_id, request).await?;
    Ok(Json(json!(updated)))
}

#[axum::debug_handler]
pub async fn save_therapist_availability(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((therapist_id, date)): Path<(String, String)>,
    ValidJson(request): ValidJson<SaveSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    let therapist_id = parse_therapist_id(&therapist_id)?;
    let date = parse_date(&date)?;
    let service = TherapistService::new(state.store.clone());

    let therapist = service.get_therapist(therapist_id).await?;
    service.ensure_can_edit(&user, &therapist)?;

    let entry = service.save_availability(therapist_id, date, request.slots).await?;
    Ok(Json(json!(entry)))
}

#[axum::debug_handler]
pub async fn copy_therapist_availability(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((therapist_id, date)): Path<(String, String)>,
    ValidJson(request): ValidJson<CopySlotsRequest>,
) -> Result<Json<Value>, AppError> {
    let therapist_id = parse_therapist_id(&therapist_id)?;
    let source = parse_date(&date)?;
    let service = TherapistService::new(state.store.clone());

    let therapist = service.get_therapist(therapist_id).await?;
    service.ensure_can_edit(&user, &therapist)?;

    let written = service
        .copy_availability(therapist_id, source, &request.target_dates)
        .await?;

    Ok(Json(json!({
        "success": true,
        "source_date": source,
        "dates_updated": written
    })))
}

#[axum::debug_handler]
pub async fn recurring_therapist_availability(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((therapist_id, date)): Path<(String, String)>,
    ValidJson(request): ValidJson<RecurringSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    let therapist_id = parse_therapist_id(&therapist_id)?;
    let source = parse_date(&date)?;
    let service = TherapistService::new(state.store.clone());

    let therapist = service.get_therapist(therapist_id).await?;
    service.ensure_can_edit(&user, &therapist)?;

    let written = service
        .apply_recurring_availability(therapist_id, source, &request.weekdays, Utc::now().date_naive())
        .await?;

    Ok(Json(json!({
        "success": true,
        "source_date": source,
        "dates_updated": written
    })))
}
