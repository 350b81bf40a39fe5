// libs/analytics-cell/src/services/buckets.rs
use chrono::NaiveDateTime;
use tracing::{debug, warn};

use appointment_cell::models::{Appointment, AppointmentStatus};

use crate::models::{
    AnalyticsError, BucketSpec, InvalidRecord, StatusCounts, TimeBucket, TimeSeriesReport,
};

/// Splits records into those that can be aggregated (usable timestamp, known
/// status) and a count of the rest. Each rejected record is logged once per call.
pub fn valid_appointments(appointments: &[Appointment]) -> (Vec<(NaiveDateTime, &Appointment)>, usize) {
    let mut dated = Vec::with_capacity(appointments.len());
    let mut invalid = 0;

    for apt in appointments {
        match (InvalidRecord::check(apt), apt.scheduled_at) {
            (None, Some(at)) => dated.push((at, apt)),
            (reason, _) => {
                invalid += 1;
                if let Some(reason) = reason {
                    warn!("Skipping record: {}", reason);
                }
            }
        }
    }

    (dated, invalid)
}

/// Counts appointments into the buckets of any [`BucketSpec`]. Hourly, daily
/// and monthly series are all produced by [`TimeBucketAggregator::aggregate`].
#[derive(Debug, Clone, Copy)]
pub struct TimeBucketAggregator {
    unit_price: f64,
}

impl TimeBucketAggregator {
    pub fn new(unit_price: f64) -> Self {
        Self { unit_price }
    }

    /// Ascending buckets for `spec`, empty ones included. Records outside the
    /// window, or without a timestamp, are not counted.
    pub fn aggregate(&self, spec: &BucketSpec, appointments: &[Appointment]) -> Vec<TimeBucket> {
        let (dated, _) = valid_appointments(appointments);
        self.aggregate_dated(spec, &dated)
    }

    fn aggregate_dated(&self, spec: &BucketSpec, dated: &[(NaiveDateTime, &Appointment)]) -> Vec<TimeBucket> {
        let starts: Vec<NaiveDateTime> = (0..=spec.count).map(|i| spec.bucket_start(i)).collect();
        let mut counts = vec![StatusCounts::default(); spec.count as usize];

        for (at, apt) in dated {
            if let Some(index) = bucket_index(&starts, *at) {
                counts[index].record(apt.status);
            }
        }

        debug!(
            "Bucketed {} records into {} {:?} buckets",
            counts.iter().map(|c| c.total).sum::<usize>(),
            spec.count,
            spec.granularity
        );

        starts
            .windows(2)
            .zip(counts)
            .map(|(bounds, counts)| TimeBucket {
                label: spec.label(bounds[0]),
                start: bounds[0],
                end: bounds[1],
                revenue: self.revenue(counts.completed),
                counts,
            })
            .collect()
    }

    /// Hourly (today), daily (trailing `daily_days`) and monthly (trailing 12)
    /// series in one pass over the timestamps.
    pub fn time_series(
        &self,
        now: NaiveDateTime,
        hourly_range: (u32, u32),
        daily_days: u32,
        appointments: &[Appointment],
    ) -> Result<TimeSeriesReport, AnalyticsError> {
        let hourly = BucketSpec::hourly_today(now, hourly_range.0, hourly_range.1)?;
        let daily = BucketSpec::trailing_days(now, daily_days)?;
        let monthly = BucketSpec::trailing_months(now, 12)?;

        let (dated, invalid_records) = valid_appointments(appointments);

        Ok(TimeSeriesReport {
            hourly: self.aggregate_dated(&hourly, &dated),
            daily: self.aggregate_dated(&daily, &dated),
            monthly: self.aggregate_dated(&monthly, &dated),
            invalid_records,
        })
    }

    pub fn revenue(&self, completed: usize) -> f64 {
        completed as f64 * self.unit_price
    }

    /// Revenue earned by completed appointments in `appointments`.
    pub fn revenue_for<'a>(&self, appointments: impl IntoIterator<Item = &'a Appointment>) -> f64 {
        self.revenue(
            appointments
                .into_iter()
                .filter(|apt| apt.status == AppointmentStatus::Completed)
                .count(),
        )
    }
}

/// `starts` holds every bucket start followed by the window end.
fn bucket_index(starts: &[NaiveDateTime], at: NaiveDateTime) -> Option<usize> {
    let last = starts.len().checked_sub(1)?;
    if at < starts[0] || at >= starts[last] {
        return None;
    }
    Some(starts.partition_point(|start| *start <= at) - 1)
}
