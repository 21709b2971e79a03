use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{require_admin, ValidJson};

use crate::models::{CreateBookingRequest, RescheduleBookingRequest, UpdateStatusRequest};
use crate::services::BookingService;

fn parse_booking_id(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|_| AppError::ValidationError(format!("Invalid booking id '{}'", value)))
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ValidJson(request): ValidJson<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = BookingService::new(state.store.clone())
        .create_booking(&user.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let bookings = BookingService::new(state.store.clone())
        .list_bookings(&user)
        .await?;

    Ok(Json(json!({
        "bookings": bookings,
        "total": bookings.len()
    })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking_id = parse_booking_id(&booking_id)?;
    let booking = BookingService::new(state.store.clone())
        .get_booking(booking_id, &user)
        .await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
    ValidJson(request): ValidJson<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let booking_id = parse_booking_id(&booking_id)?;

    let booking = BookingService::new(state.store.clone())
        .update_status(booking_id, request.status)
        .await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn reschedule_booking(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
    ValidJson(request): ValidJson<RescheduleBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_id = parse_booking_id(&booking_id)?;

    let booking = BookingService::new(state.store.clone())
        .reschedule(booking_id, &user, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}
