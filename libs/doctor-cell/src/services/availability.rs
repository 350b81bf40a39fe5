use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use appointment_cell::models::{Appointment, AppointmentStatus};
use shared_config::AppConfig;
use shared_models::RecordId;

use crate::models::{BookingDay, Slot, SlotError, UnavailableReason, WorkingHours};

/// Slot start times already taken for one doctor on one date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookedSlots {
    times: BTreeSet<NaiveTime>,
}

impl BookedSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupied slots derived from real appointments. Only live bookings
    /// (scheduled or in progress) hold a slot; each occupies the slot containing
    /// its start time.
    pub fn from_appointments(
        doctor_id: &RecordId,
        date: NaiveDate,
        appointments: &[Appointment],
        hours: &WorkingHours,
    ) -> Self {
        let times = appointments
            .iter()
            .filter(|apt| &apt.doctor_id == doctor_id)
            .filter(|apt| {
                matches!(apt.status, AppointmentStatus::Scheduled | AppointmentStatus::InProgress)
            })
            .filter_map(|apt| apt.scheduled_at)
            .filter(|at| at.date() == date)
            .filter_map(|at| hours.slot_start_for(at.time()))
            .collect();

        Self { times }
    }

    pub fn insert(&mut self, time: NaiveTime) {
        self.times.insert(time);
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.times.contains(&time)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl FromIterator<NaiveTime> for BookedSlots {
    fn from_iter<I: IntoIterator<Item = NaiveTime>>(iter: I) -> Self {
        Self {
            times: iter.into_iter().collect(),
        }
    }
}

pub struct AvailabilityService {
    hours: WorkingHours,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            hours: WorkingHours::from(config),
        }
    }

    pub fn with_hours(hours: WorkingHours) -> Self {
        Self { hours }
    }

    /// Every slot in the working window for `date`, ascending. Slots before `now`
    /// or already booked stay in the list, marked unavailable.
    pub fn generate_slots(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
        booked: &BookedSlots,
    ) -> Result<Vec<Slot>, SlotError> {
        self.hours.validate()?;
        debug!("Generating slots for {} with {} booked", date, booked.len());

        let open = date
            .and_hms_opt(self.hours.open_hour, 0, 0)
            .ok_or_else(|| SlotError::InvalidWindow(format!("bad opening hour {}", self.hours.open_hour)))?;
        let step = Duration::minutes(i64::from(self.hours.slot_minutes));

        let slots = (0..self.hours.slots_per_day())
            .map(|index| {
                let date_time = open + step * index as i32;
                let reason = if date_time < now {
                    Some(UnavailableReason::Past)
                } else if booked.contains(date_time.time()) {
                    Some(UnavailableReason::Booked)
                } else {
                    None
                };

                Slot {
                    time: date_time.format("%H:%M").to_string(),
                    available: reason.is_none(),
                    date_time,
                    unavailable_reason: reason,
                }
            })
            .collect::<Vec<_>>();

        if slots.iter().all(|slot| !slot.available) {
            warn!("No bookable slots left on {}", date);
        }

        Ok(slots)
    }

    /// Slots for one doctor, with occupancy taken from that doctor's appointments
    /// plus any explicitly booked start times.
    pub fn slots_for_doctor(
        &self,
        doctor_id: &RecordId,
        date: NaiveDate,
        now: NaiveDateTime,
        appointments: &[Appointment],
        extra_booked: &[NaiveTime],
    ) -> Result<Vec<Slot>, SlotError> {
        let mut booked = BookedSlots::from_appointments(doctor_id, date, appointments, &self.hours);
        for time in extra_booked {
            if let Some(start) = self.hours.slot_start_for(*time) {
                booked.insert(start);
            }
        }

        self.generate_slots(date, now, &booked)
    }

    /// The next `days` calendar dates starting at `today`, for the schedule picker.
    pub fn booking_week(&self, today: NaiveDate, days: u32) -> Vec<BookingDay> {
        today
            .iter_days()
            .take(days as usize)
            .map(|date| BookingDay {
                date,
                weekday: date.format("%a").to_string(),
                day_of_month: date.day(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_start_snaps_into_window() {
        let hours = WorkingHours::default();
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        assert_eq!(hours.slot_start_for(t(9, 0)), Some(t(9, 0)));
        assert_eq!(hours.slot_start_for(t(9, 45)), Some(t(9, 30)));
        assert_eq!(hours.slot_start_for(t(16, 59)), Some(t(16, 30)));
        assert_eq!(hours.slot_start_for(t(17, 0)), None);
        assert_eq!(hours.slot_start_for(t(8, 59)), None);
    }

    #[test]
    fn test_booking_week_starts_today() {
        let service = AvailabilityService::with_hours(WorkingHours::default());
        let today = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap();
        let week = service.booking_week(today, 7);

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, today);
        assert_eq!(week[0].weekday, "Sun");
        assert_eq!(week[6].date, NaiveDate::from_ymd_opt(2025, 1, 4).unwrap());
    }
}
