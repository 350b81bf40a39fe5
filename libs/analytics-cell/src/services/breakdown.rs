// libs/analytics-cell/src/services/breakdown.rs
use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use tracing::debug;

use appointment_cell::models::Appointment;
use shared_models::{Doctor, Patient};

use crate::models::{
    first_of_month, AgeBand, AgeBandCount, Breakdown, Demographics, DoctorPerformance,
    InvalidRecord, Overview, StatusCounts,
};
use crate::services::buckets::{valid_appointments, TimeBucketAggregator};

/// Rates, per-doctor performance, demographics and the dashboard overview.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalAggregator {
    pricing: TimeBucketAggregator,
}

impl CategoricalAggregator {
    pub fn new(unit_price: f64) -> Self {
        Self {
            pricing: TimeBucketAggregator::new(unit_price),
        }
    }

    /// One entry per doctor, in the order the doctors were given.
    pub fn doctor_performance(&self, doctors: &[Doctor], appointments: &[Appointment]) -> Vec<DoctorPerformance> {
        doctors
            .iter()
            .map(|doctor| {
                let counts = StatusCounts::from_appointments(
                    appointments.iter().filter(|apt| apt.doctor_id == doctor.id),
                );

                DoctorPerformance {
                    doctor_id: doctor.id.clone(),
                    doctor_name: doctor.display_name(),
                    specialization: doctor.specialization.clone(),
                    total_appointments: counts.total,
                    completed_appointments: counts.completed,
                    completion_rate: counts.completion_rate(),
                    estimated_revenue: self.pricing.revenue(counts.completed),
                }
            })
            .collect()
    }

    /// Age bands as of `today` plus a count per gender value present. Patients
    /// without a readable birth date are left out of the bands only.
    pub fn demographics(&self, patients: &[Patient], today: NaiveDate) -> Demographics {
        let mut bands: BTreeMap<AgeBand, usize> = AgeBand::ALL.iter().map(|band| (*band, 0)).collect();
        let mut genders: BTreeMap<String, usize> = BTreeMap::new();
        let mut missing_birth_dates = 0;

        for patient in patients {
            match patient.age_on(today) {
                Some(age) => *bands.entry(AgeBand::for_age(age)).or_default() += 1,
                None => missing_birth_dates += 1,
            }

            if let Some(gender) = patient.gender.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
                *genders.entry(gender.to_string()).or_default() += 1;
            }
        }

        Demographics {
            total_patients: patients.len(),
            missing_birth_dates,
            age_bands: bands
                .into_iter()
                .map(|(band, count)| AgeBandCount { band, count })
                .collect(),
            genders,
        }
    }

    pub fn overview(&self, now: NaiveDateTime, appointments: &[Appointment]) -> Overview {
        let counts = StatusCounts::from_appointments(appointments);
        let (dated, _) = valid_appointments(appointments);

        let this_month = first_of_month(now.date());
        let last_month = this_month - Months::new(1);
        let in_month = |month: NaiveDate| {
            dated
                .iter()
                .filter(|(at, _)| first_of_month(at.date()) == month)
                .map(|(_, apt)| *apt)
                .collect::<Vec<_>>()
        };

        let current = in_month(this_month);
        let this_month_appointments = current.len();
        let last_month_appointments = in_month(last_month).len();
        let this_month_revenue = self.pricing.revenue_for(current);

        Overview {
            completion_rate: counts.completion_rate(),
            cancellation_rate: counts.cancellation_rate(),
            total_revenue: self.pricing.revenue(counts.completed),
            this_month_appointments,
            last_month_appointments,
            this_month_revenue,
            average_per_day: this_month_appointments as f64 / f64::from(now.day()),
            counts,
        }
    }

    pub fn breakdown(
        &self,
        now: NaiveDateTime,
        appointments: &[Appointment],
        patients: &[Patient],
        doctors: &[Doctor],
    ) -> Breakdown {
        let invalid_records = appointments
            .iter()
            .filter(|apt| InvalidRecord::check(apt).is_some())
            .count();
        debug!(
            "Breaking down {} appointments, {} patients, {} doctors",
            appointments.len(),
            patients.len(),
            doctors.len()
        );

        Breakdown {
            overview: self.overview(now, appointments),
            doctors: self.doctor_performance(doctors, appointments),
            demographics: self.demographics(patients, now.date()),
            invalid_records,
        }
    }
}
