// libs/analytics-cell/tests/reports_test.rs

use chrono::{NaiveDate, NaiveDateTime};

use analytics_cell::models::ReportPeriod;
use analytics_cell::services::{render_csv, PeriodReportService};
use appointment_cell::models::{Appointment, AppointmentStatus, Priority};
use shared_models::RecordId;

fn at(m: u32, d: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap().and_hms_opt(hour, 0, 0).unwrap()
}

fn appointment(id: i64, scheduled_at: Option<NaiveDateTime>, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: RecordId::Int(id),
        patient_id: RecordId::Int(1),
        doctor_id: RecordId::Int(2),
        scheduled_at,
        status,
        priority: Priority::High,
        reason: None,
        notes: None,
    }
}

#[test]
fn test_period_windows() {
    // Wednesday
    let now = at(5, 15, 14);

    assert_eq!(ReportPeriod::Today.window(now), (at(5, 15, 0), at(5, 16, 0)));
    assert_eq!(ReportPeriod::ThisWeek.window(now), (at(5, 12, 0), at(5, 19, 0)));
    assert_eq!(ReportPeriod::ThisMonth.window(now), (at(5, 1, 0), at(6, 1, 0)));
    assert_eq!(
        ReportPeriod::ThisYear.window(now),
        (at(1, 1, 0), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
    );
}

#[test]
fn test_week_starting_on_sunday_contains_itself() {
    let sunday = at(5, 12, 9);
    assert_eq!(ReportPeriod::ThisWeek.window(sunday).0, at(5, 12, 0));
}

#[test]
fn test_this_month_report() {
    let service = PeriodReportService::new(150.0);
    let appointments = vec![
        appointment(1, Some(at(5, 1, 9)), AppointmentStatus::Completed),
        appointment(2, Some(at(5, 20, 9)), AppointmentStatus::Scheduled),
        appointment(3, Some(at(5, 31, 23)), AppointmentStatus::InProgress),
        appointment(4, Some(at(6, 1, 0)), AppointmentStatus::Completed),
        appointment(5, Some(at(4, 30, 23)), AppointmentStatus::Cancelled),
        appointment(6, None, AppointmentStatus::Completed),
    ];

    let report = service.report(ReportPeriod::ThisMonth, at(5, 15, 14), &appointments);

    assert_eq!(report.period, ReportPeriod::ThisMonth);
    assert_eq!(report.counts.total, 3);
    assert_eq!(report.counts.completed, 1);
    assert_eq!(report.counts.scheduled, 1);
    assert_eq!(report.counts.in_progress, 1);
    assert_eq!(report.counts.cancelled, 0);
    assert_eq!(report.revenue, 150.0);
    assert_eq!(report.invalid_records, 1);
}

#[test]
fn test_empty_report_has_zero_rate() {
    let service = PeriodReportService::new(150.0);
    let report = service.report(ReportPeriod::Today, at(5, 15, 14), &[]);

    assert_eq!(report.counts.total, 0);
    assert_eq!(report.completion_rate, 0.0);
    assert_eq!(report.revenue, 0.0);
}

#[test]
fn test_report_renders_as_metric_value_csv() {
    let service = PeriodReportService::new(150.0);
    let appointments = vec![
        appointment(1, Some(at(5, 1, 9)), AppointmentStatus::Completed),
        appointment(2, Some(at(5, 2, 9)), AppointmentStatus::Cancelled),
        appointment(3, None, AppointmentStatus::Scheduled),
    ];

    let report = service.report(ReportPeriod::ThisMonth, at(5, 15, 14), &appointments);

    assert_eq!(
        render_csv(&report),
        "Metric,Value\n\
         Period,this-month\n\
         Start,2024-05-01T00:00:00\n\
         End,2024-06-01T00:00:00\n\
         Total Appointments,2\n\
         Completed,1\n\
         Cancelled,1\n\
         Scheduled,0\n\
         In Progress,0\n\
         Revenue,150.00\n\
         Completion Rate,50.0%\n\
         Invalid Records,1\n"
    );
}
