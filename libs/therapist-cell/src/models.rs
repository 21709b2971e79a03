use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

/// Delivery channel of a session. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum SessionMode {
    Online,
    Offline,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Online => write!(f, "ONLINE"),
            SessionMode::Offline => write!(f, "OFFLINE"),
        }
    }
}

impl FromStr for SessionMode {
    type Err = TherapistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => Ok(SessionMode::Online),
            "OFFLINE" => Ok(SessionMode::Offline),
            other => Err(TherapistError::InvalidInput(format!(
                "Unknown session mode '{}', expected ONLINE or OFFLINE",
                other
            ))),
        }
    }
}

impl TryFrom<String> for SessionMode {
    type Error = TherapistError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Reads a stored time of day. Values that are not strings become text that
/// never parses, so the window is treated as malformed instead of failing the
/// whole document.
fn lenient_time<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(time) => time,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Wall-clock window on a single day, persisted as `"HH:MM"` strings.
///
/// The strings are kept as stored so that legacy malformed values survive a
/// read and can be reported instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default, deserialize_with = "lenient_time")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient_time")]
    pub to: String,
}

impl TimeWindow {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Admin-curated bookable windows for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub slots: Vec<TimeWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapistAvailabilityEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub slots: Vec<TimeWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Therapist {
    pub id: Uuid,
    /// Expert account that owns this profile.
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub supported_modes: Vec<SessionMode>,
    #[serde(default)]
    pub availability: Vec<TherapistAvailabilityEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Therapist {
    pub fn supports_mode(&self, mode: SessionMode) -> bool {
        self.supported_modes.contains(&mode)
    }

    /// Expertise is matched on therapy display names, not therapy ids.
    pub fn has_expertise_in(&self, therapy_names: &[String]) -> bool {
        self.expertise
            .iter()
            .any(|name| therapy_names.iter().any(|requested| requested == name))
    }

    /// Slots of the first availability entry for `date`.
    pub fn slots_on(&self, date: NaiveDate) -> Option<&[TimeWindow]> {
        self.availability
            .iter()
            .find(|entry| entry.date == date)
            .map(|entry| entry.slots.as_slice())
    }
}

/// Availability lookup options.
///
/// `mode` and `therapy_names` default to `None`, which means browse only:
/// catalog windows come back without `has_expert`. Both must be present for
/// the windows to be annotated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub mode: Option<SessionMode>,
    #[serde(default)]
    pub therapy_names: Option<Vec<String>>,
}

/// One bookable window and the constraints it must be matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub date: NaiveDate,
    pub mode: SessionMode,
    pub window: TimeWindow,
    pub therapy_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedWindow {
    #[serde(flatten)]
    pub window: TimeWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_expert: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTherapistRequest {
    pub name: String,
    pub about: Option<String>,
    pub photo: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub supported_modes: Vec<SessionMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTherapistRequest {
    pub name: Option<String>,
    pub about: Option<String>,
    pub photo: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub supported_modes: Option<Vec<SessionMode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSlotsRequest {
    pub slots: Vec<TimeWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopySlotsRequest {
    pub target_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringSlotsRequest {
    pub weekdays: Vec<String>,
}

#[derive(Error, Debug)]
pub enum TherapistError {
    #[error("Validation error: {0}")]
    InvalidInput(String),

    #[error("Therapist not found")]
    TherapistNotFound,

    #[error("A therapist profile already exists for this account")]
    AlreadyExists,

    #[error("No experts available for the selected timeslot")]
    NoQualifyingTherapist,

    #[error("Unauthorized access to therapist data")]
    Forbidden,

    #[error("Database error: {0}")]
    Store(String),
}

impl From<anyhow::Error> for TherapistError {
    fn from(e: anyhow::Error) -> Self {
        TherapistError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for TherapistError {
    fn from(e: serde_json::Error) -> Self {
        TherapistError::Store(format!("Corrupt document: {}", e))
    }
}

impl From<TherapistError> for AppError {
    fn from(e: TherapistError) -> Self {
        match e {
            TherapistError::InvalidInput(msg) => AppError::ValidationError(msg),
            TherapistError::TherapistNotFound => AppError::NotFound(e.to_string()),
            TherapistError::AlreadyExists | TherapistError::NoQualifyingTherapist => {
                AppError::Conflict(e.to_string())
            }
            TherapistError::Forbidden => AppError::Forbidden(e.to_string()),
            TherapistError::Store(msg) => AppError::Database(msg),
        }
    }
}
