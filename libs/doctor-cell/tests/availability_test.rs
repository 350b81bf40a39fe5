// libs/doctor-cell/tests/availability_test.rs

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use appointment_cell::models::{Appointment, AppointmentStatus, Priority};
use doctor_cell::models::{SlotError, UnavailableReason, WorkingHours};
use doctor_cell::services::{AvailabilityService, BookedSlots};
use shared_config::AppConfig;
use shared_models::RecordId;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    day().and_hms_opt(hour, minute, 0).unwrap()
}

fn service() -> AvailabilityService {
    AvailabilityService::new(&AppConfig::default())
}

fn booking(id: i64, doctor: i64, scheduled_at: NaiveDateTime, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: RecordId::Int(id),
        patient_id: RecordId::Int(100),
        doctor_id: RecordId::Int(doctor),
        scheduled_at: Some(scheduled_at),
        status,
        priority: Priority::Medium,
        reason: None,
        notes: None,
    }
}

#[test]
fn test_full_day_has_sixteen_ordered_slots() {
    let slots = service()
        .generate_slots(day(), at(0, 0), &BookedSlots::new())
        .unwrap();

    assert_eq!(slots.len(), 16);
    assert_eq!(slots.first().unwrap().time, "09:00");
    assert_eq!(slots.last().unwrap().time, "16:30");
    assert!(slots.windows(2).all(|pair| pair[0].date_time < pair[1].date_time));
    assert!(slots.iter().all(|slot| slot.available));
}

#[test]
fn test_slots_before_now_are_past() {
    let slots = service()
        .generate_slots(day(), at(11, 15), &BookedSlots::new())
        .unwrap();

    let past: Vec<_> = slots.iter().filter(|slot| !slot.available).map(|slot| slot.time.as_str()).collect();
    assert_eq!(past, vec!["09:00", "09:30", "10:00", "10:30", "11:00"]);
    assert!(slots
        .iter()
        .filter(|slot| !slot.available)
        .all(|slot| slot.unavailable_reason == Some(UnavailableReason::Past)));
}

#[test]
fn test_past_date_has_no_open_slots() {
    let tomorrow = day().succ_opt().unwrap().and_hms_opt(8, 0, 0).unwrap();
    let slots = service().generate_slots(day(), tomorrow, &BookedSlots::new()).unwrap();

    assert_eq!(slots.len(), 16);
    assert!(slots.iter().all(|slot| !slot.available));
}

#[test]
fn test_live_bookings_block_their_slot() {
    let appointments = vec![
        booking(1, 7, at(10, 0), AppointmentStatus::Scheduled),
        booking(2, 7, at(13, 40), AppointmentStatus::InProgress),
        booking(3, 7, at(14, 0), AppointmentStatus::Cancelled),
        booking(4, 7, at(15, 0), AppointmentStatus::Completed),
        booking(5, 8, at(11, 0), AppointmentStatus::Scheduled),
    ];

    let slots = service()
        .slots_for_doctor(&RecordId::Int(7), day(), at(0, 0), &appointments, &[])
        .unwrap();

    let booked: Vec<_> = slots
        .iter()
        .filter(|slot| slot.unavailable_reason == Some(UnavailableReason::Booked))
        .map(|slot| slot.time.as_str())
        .collect();
    assert_eq!(booked, vec!["10:00", "13:30"]);
}

#[test]
fn test_explicit_booked_times_merge_with_appointments() {
    let appointments = vec![booking(1, 7, at(9, 0), AppointmentStatus::Scheduled)];
    let extra = [NaiveTime::from_hms_opt(16, 30, 0).unwrap(), NaiveTime::from_hms_opt(18, 0, 0).unwrap()];

    let slots = service()
        .slots_for_doctor(&RecordId::Int(7), day(), at(0, 0), &appointments, &extra)
        .unwrap();

    assert_eq!(slots.iter().filter(|slot| !slot.available).count(), 2);
    assert!(!slots[0].available);
    assert!(!slots[15].available);
}

#[test]
fn test_past_wins_over_booked() {
    let booked: BookedSlots = [NaiveTime::from_hms_opt(9, 0, 0).unwrap()].into_iter().collect();
    let slots = service().generate_slots(day(), at(12, 0), &booked).unwrap();

    assert_eq!(slots[0].unavailable_reason, Some(UnavailableReason::Past));
}

#[test]
fn test_generation_is_deterministic() {
    let booked: BookedSlots = [NaiveTime::from_hms_opt(11, 0, 0).unwrap()].into_iter().collect();
    let first = service().generate_slots(day(), at(10, 0), &booked).unwrap();
    let second = service().generate_slots(day(), at(10, 0), &booked).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_invalid_window_is_rejected() {
    let closed = AvailabilityService::with_hours(WorkingHours {
        open_hour: 17,
        close_hour: 9,
        slot_minutes: 30,
    });
    assert_matches!(
        closed.generate_slots(day(), at(0, 0), &BookedSlots::new()),
        Err(SlotError::InvalidWindow(_))
    );

    let uneven = AvailabilityService::with_hours(WorkingHours {
        open_hour: 9,
        close_hour: 17,
        slot_minutes: 25,
    });
    assert_matches!(
        uneven.generate_slots(day(), at(0, 0), &BookedSlots::new()),
        Err(SlotError::InvalidWindow(_))
    );
}

#[test]
fn test_hourly_slots_follow_config() {
    let hourly = AvailabilityService::with_hours(WorkingHours {
        open_hour: 8,
        close_hour: 12,
        slot_minutes: 60,
    });
    let slots = hourly.generate_slots(day(), at(0, 0), &BookedSlots::new()).unwrap();

    let times: Vec<_> = slots.iter().map(|slot| slot.time.as_str()).collect();
    assert_eq!(times, vec!["08:00", "09:00", "10:00", "11:00"]);
}
