// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

use shared_models::datetime::deserialize_lenient;
use shared_models::{Doctor, Patient, RecordId};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    #[serde(alias = "appointment_date", default, deserialize_with = "deserialize_lenient")]
    pub scheduled_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_status_lenient")]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Appointment {
    /// Calendar day of the scheduled start, ignoring the time of day.
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_at.map(|at| at.date())
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.scheduled_date() == Some(date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    #[serde(alias = "in_progress")]
    InProgress,
    Completed,
    Cancelled,
    /// A backend value outside the vocabulary. Never requested by callers; records
    /// carrying it are reported rather than counted.
    #[serde(skip_deserializing)]
    Unrecognized,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn is_recognized(&self) -> bool {
        *self != AppointmentStatus::Unrecognized
    }

    /// Backend status text, which is free-form. Unknown values map to `Unrecognized`.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => AppointmentStatus::Scheduled,
            "in-progress" | "in_progress" => AppointmentStatus::InProgress,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Unrecognized,
        }
    }
}

/// Missing or null status means a fresh booking; anything unreadable is kept as
/// `Unrecognized` instead of failing the payload.
fn deserialize_status_lenient<'de, D>(deserializer: D) -> Result<AppointmentStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => AppointmentStatus::default(),
        Some(Value::String(text)) => AppointmentStatus::from_wire(&text),
        Some(_) => AppointmentStatus::Unrecognized,
    })
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::InProgress => write!(f, "in-progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Descriptive only; never consulted by scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Status-changing operations a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentAction {
    Start,
    Complete,
    Reschedule,
    Cancel,
}

impl AppointmentAction {
    /// Status the appointment ends up in. Rescheduling cancels the original.
    pub fn target_status(&self) -> AppointmentStatus {
        match self {
            AppointmentAction::Start => AppointmentStatus::InProgress,
            AppointmentAction::Complete => AppointmentStatus::Completed,
            AppointmentAction::Reschedule | AppointmentAction::Cancel => AppointmentStatus::Cancelled,
        }
    }
}

impl fmt::Display for AppointmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentAction::Start => write!(f, "start"),
            AppointmentAction::Complete => write!(f, "complete"),
            AppointmentAction::Reschedule => write!(f, "reschedule"),
            AppointmentAction::Cancel => write!(f, "cancel"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Replacement booking produced by a reschedule. The backend assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointmentRequest {
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    pub scheduled_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub priority: Priority,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub rescheduled_from: RecordId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleOutcome {
    pub cancelled: Appointment,
    pub replacement: NewAppointmentRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub appointment: Appointment,
    pub action: AppointmentAction,
    /// Parsed strictly by the handler.
    #[serde(default)]
    pub new_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionResponse {
    pub appointment: Appointment,
    pub replacement: Option<NewAppointmentRequest>,
    pub available_actions: Vec<AppointmentAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarRequest {
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub selected: Option<NaiveDate>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub now: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub filter: AppointmentFilter,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientAppointments {
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
}

// ==============================================================================
// CALENDAR MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_current_month: bool,
    pub appointments: Vec<Appointment>,
}

/// Month laid out Sunday-first. Leading blanks are `None`; trailing cells of the
/// last row are not materialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarGrid {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub days_in_month: u32,
    pub rows: Vec<Vec<Option<DayCell>>>,
}

impl CalendarGrid {
    pub fn cells(&self) -> impl Iterator<Item = &Option<DayCell>> {
        self.rows.iter().flatten()
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Cannot {action} an appointment that is {status}")]
    InvalidTransition {
        action: AppointmentAction,
        status: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("Year {0} is outside the supported calendar range")]
    InvalidYear(i32),
}
