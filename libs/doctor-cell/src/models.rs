use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use appointment_cell::models::Appointment;
use shared_config::AppConfig;

// ==============================================================================
// WORKING HOURS
// ==============================================================================

/// Bookable window for one day: `[open_hour:00, close_hour:00)` cut into
/// `slot_minutes` increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_minutes: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 17,
            slot_minutes: 30,
        }
    }
}

impl From<&AppConfig> for WorkingHours {
    fn from(config: &AppConfig) -> Self {
        Self {
            open_hour: config.clinic_open_hour,
            close_hour: config.clinic_close_hour,
            slot_minutes: config.slot_minutes,
        }
    }
}

impl WorkingHours {
    pub fn validate(&self) -> Result<(), SlotError> {
        if self.open_hour >= self.close_hour || self.close_hour > 24 {
            return Err(SlotError::InvalidWindow(format!(
                "opening hour {} must be before closing hour {} (max 24)",
                self.open_hour, self.close_hour
            )));
        }
        if self.slot_minutes == 0 || 60 % self.slot_minutes != 0 {
            return Err(SlotError::InvalidWindow(format!(
                "slot length {} minutes must evenly divide an hour",
                self.slot_minutes
            )));
        }
        Ok(())
    }

    pub fn slots_per_day(&self) -> u32 {
        (self.close_hour - self.open_hour) * 60 / self.slot_minutes
    }

    /// Start of the slot containing `time`, if it lies inside the window.
    pub fn slot_start_for(&self, time: NaiveTime) -> Option<NaiveTime> {
        let minutes = time.hour() * 60 + time.minute();
        let open = self.open_hour * 60;
        let close = self.close_hour * 60;
        if minutes < open || minutes >= close {
            return None;
        }
        let start = open + (minutes - open) / self.slot_minutes * self.slot_minutes;
        NaiveTime::from_hms_opt(start / 60, start % 60, 0)
    }
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// `HH:MM`
    pub time: String,
    pub available: bool,
    pub date_time: NaiveDateTime,
    pub unavailable_reason: Option<UnavailableReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    Past,
    Booked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub day_of_month: u32,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQueryRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    /// Extra occupied start times not yet present in `appointments`.
    #[serde(default)]
    pub booked_times: Vec<NaiveTime>,
    #[serde(default)]
    pub now: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingWeekQuery {
    pub from: Option<NaiveDate>,
    pub days: Option<u32>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SlotError {
    #[error("Invalid working-hours window: {0}")]
    InvalidWindow(String),
}
