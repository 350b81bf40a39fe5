// libs/analytics-cell/src/services/reports.rs
use std::fmt::Write;

use chrono::NaiveDateTime;
use tracing::info;

use appointment_cell::models::Appointment;

use crate::models::{PeriodReport, ReportPeriod, StatusCounts};
use crate::services::buckets::{valid_appointments, TimeBucketAggregator};

#[derive(Debug, Clone, Copy)]
pub struct PeriodReportService {
    pricing: TimeBucketAggregator,
}

impl PeriodReportService {
    pub fn new(unit_price: f64) -> Self {
        Self {
            pricing: TimeBucketAggregator::new(unit_price),
        }
    }

    pub fn report(&self, period: ReportPeriod, now: NaiveDateTime, appointments: &[Appointment]) -> PeriodReport {
        let (start, end) = period.window(now);
        let (dated, invalid_records) = valid_appointments(appointments);

        let counts = StatusCounts::from_appointments(
            dated
                .iter()
                .filter(|(at, _)| *at >= start && *at < end)
                .map(|(_, apt)| *apt),
        );

        info!("{} report: {} appointments between {} and {}", period, counts.total, start, end);

        PeriodReport {
            period,
            start,
            end,
            revenue: self.pricing.revenue(counts.completed),
            completion_rate: counts.completion_rate(),
            counts,
            invalid_records,
        }
    }
}

/// Two-column `Metric,Value` export of a period report. Every value is
/// plain ASCII without commas, so no field needs quoting.
pub fn render_csv(report: &PeriodReport) -> String {
    let rows: [(&str, String); 11] = [
        ("Period", report.period.to_string()),
        ("Start", report.start.format("%Y-%m-%dT%H:%M:%S").to_string()),
        ("End", report.end.format("%Y-%m-%dT%H:%M:%S").to_string()),
        ("Total Appointments", report.counts.total.to_string()),
        ("Completed", report.counts.completed.to_string()),
        ("Cancelled", report.counts.cancelled.to_string()),
        ("Scheduled", report.counts.scheduled.to_string()),
        ("In Progress", report.counts.in_progress.to_string()),
        ("Revenue", format!("{:.2}", report.revenue)),
        ("Completion Rate", format!("{:.1}%", report.completion_rate * 100.0)),
        ("Invalid Records", report.invalid_records.to_string()),
    ];

    let mut csv = String::from("Metric,Value\n");
    for (metric, value) in rows {
        // Writing into a String cannot fail.
        let _ = writeln!(csv, "{},{}", metric, value);
    }
    csv
}
