use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use therapist_cell::models::{SessionMode, TherapistError, TimeWindow};

// ==============================================================================
// BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Paid,
    Failed,
    Canceled,
    Refunded,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "PENDING"),
            BookingStatus::Paid => write!(f, "PAID"),
            BookingStatus::Failed => write!(f, "FAILED"),
            BookingStatus::Canceled => write!(f, "CANCELED"),
            BookingStatus::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// A therapy picked by the client. Only `name` takes part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapySelection {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub client_id: String,
    pub date: NaiveDate,
    pub timeslot: TimeWindow,
    pub mode: SessionMode,
    pub therapies: Vec<TherapySelection>,
    pub therapist_id: Uuid,
    /// Copied from the therapist at assignment time.
    pub therapist_name: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn therapy_names(&self) -> Vec<String> {
        self.therapies.iter().map(|t| t.name.clone()).collect()
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub date: NaiveDate,
    pub timeslot: TimeWindow,
    pub mode: SessionMode,
    pub therapies: Vec<TherapySelection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleBookingRequest {
    pub date: NaiveDate,
    pub timeslot: TimeWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking not found")]
    NotFound,

    #[error("No experts available for the selected timeslot")]
    NoQualifyingTherapist,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: BookingStatus, to: BookingStatus },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access to booking")]
    Unauthorized,

    #[error("Database error: {0}")]
    Store(String),
}

impl From<anyhow::Error> for BookingError {
    fn from(e: anyhow::Error) -> Self {
        BookingError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for BookingError {
    fn from(e: serde_json::Error) -> Self {
        BookingError::Store(format!("Corrupt document: {}", e))
    }
}

impl From<TherapistError> for BookingError {
    fn from(e: TherapistError) -> Self {
        match e {
            TherapistError::InvalidInput(msg) => BookingError::ValidationError(msg),
            TherapistError::NoQualifyingTherapist => BookingError::NoQualifyingTherapist,
            TherapistError::Store(msg) => BookingError::Store(msg),
            other => BookingError::Store(other.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::NotFound => AppError::NotFound(e.to_string()),
            BookingError::NoQualifyingTherapist | BookingError::InvalidStatusTransition { .. } => {
                AppError::Conflict(e.to_string())
            }
            BookingError::ValidationError(msg) => AppError::ValidationError(msg),
            BookingError::Unauthorized => AppError::Forbidden(e.to_string()),
            BookingError::Store(msg) => AppError::Database(msg),
        }
    }
}
