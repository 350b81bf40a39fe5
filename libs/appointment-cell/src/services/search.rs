// libs/appointment-cell/src/services/search.rs
use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use shared_models::{Doctor, Patient, RecordId};

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, PatientAppointments};

pub struct AppointmentSearchService;

impl AppointmentSearchService {
    pub fn new() -> Self {
        Self
    }

    /// Apply status, day and free-text filters, newest first. Appointments without
    /// a usable time sort last.
    pub fn filter_appointments(
        &self,
        filter: &AppointmentFilter,
        appointments: &[Appointment],
        patients: &[Patient],
        doctors: &[Doctor],
    ) -> Vec<Appointment> {
        let patient_names: HashMap<&RecordId, String> = patients
            .iter()
            .map(|p| (&p.id, p.full_name().to_lowercase()))
            .collect();
        let doctor_names: HashMap<&RecordId, String> = doctors
            .iter()
            .map(|d| (&d.id, d.display_name().to_lowercase()))
            .collect();

        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<Appointment> = appointments
            .iter()
            .filter(|apt| filter.status.map_or(true, |status| apt.status == status))
            .filter(|apt| filter.date.map_or(true, |date| apt.is_on(date)))
            .filter(|apt| match &needle {
                None => true,
                Some(needle) => {
                    let text_hit = [&apt.reason, &apt.notes]
                        .into_iter()
                        .flatten()
                        .any(|text| text.to_lowercase().contains(needle.as_str()));
                    let patient_hit = patient_names
                        .get(&apt.patient_id)
                        .is_some_and(|name| name.contains(needle.as_str()));
                    let doctor_hit = doctor_names
                        .get(&apt.doctor_id)
                        .is_some_and(|name| name.contains(needle.as_str()));
                    text_hit || patient_hit || doctor_hit
                }
            })
            .cloned()
            .collect();

        // Option orders None first, so reversing puts undated records last.
        matches.sort_by_key(|apt| Reverse(apt.scheduled_at));

        debug!("Appointment filter matched {} of {}", matches.len(), appointments.len());
        matches
    }

    /// Upcoming (anything not completed) and past (completed) appointments for one
    /// patient.
    pub fn split_for_patient(
        &self,
        patient_id: &RecordId,
        appointments: &[Appointment],
    ) -> PatientAppointments {
        let (past, upcoming): (Vec<Appointment>, Vec<Appointment>) = appointments
            .iter()
            .filter(|apt| &apt.patient_id == patient_id)
            .cloned()
            .partition(|apt| apt.status == AppointmentStatus::Completed);

        PatientAppointments { upcoming, past }
    }
}

impl Default for AppointmentSearchService {
    fn default() -> Self {
        Self::new()
    }
}
