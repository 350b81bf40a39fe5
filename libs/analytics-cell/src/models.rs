// libs/analytics-cell/src/models.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use appointment_cell::models::{Appointment, AppointmentStatus};
use shared_models::{Doctor, Patient, RecordId};

// ==============================================================================
// TIME BUCKETS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hour,
    Day,
    Month,
}

/// A contiguous run of equal-width buckets: `count` buckets of `granularity`
/// starting at `start`. Every bucket is half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub granularity: Granularity,
    pub start: NaiveDateTime,
    pub count: u32,
}

impl BucketSpec {
    /// One bucket per hour of `now`'s date, `start_hour..=end_hour`.
    pub fn hourly_today(now: NaiveDateTime, start_hour: u32, end_hour: u32) -> Result<Self, AnalyticsError> {
        if start_hour > end_hour || end_hour > 23 {
            return Err(AnalyticsError::InvalidBucketRange(format!(
                "hourly range {}..={} must lie within 0..=23",
                start_hour, end_hour
            )));
        }
        let start = now
            .date()
            .and_hms_opt(start_hour, 0, 0)
            .ok_or_else(|| AnalyticsError::InvalidBucketRange(format!("bad start hour {}", start_hour)))?;

        Ok(Self {
            granularity: Granularity::Hour,
            start,
            count: end_hour - start_hour + 1,
        })
    }

    /// The last `days` calendar days ending with (and including) today.
    pub fn trailing_days(now: NaiveDateTime, days: u32) -> Result<Self, AnalyticsError> {
        if days == 0 {
            return Err(AnalyticsError::InvalidBucketRange("daily window needs at least one day".to_string()));
        }
        let first = now.date() - Duration::days(i64::from(days) - 1);

        Ok(Self {
            granularity: Granularity::Day,
            start: first.and_time(NaiveTime::MIN),
            count: days,
        })
    }

    /// The last `months` calendar months ending with (and including) the current one.
    pub fn trailing_months(now: NaiveDateTime, months: u32) -> Result<Self, AnalyticsError> {
        if months == 0 {
            return Err(AnalyticsError::InvalidBucketRange("monthly window needs at least one month".to_string()));
        }
        let this_month = first_of_month(now.date());
        let first = this_month
            .checked_sub_months(Months::new(months - 1))
            .ok_or_else(|| AnalyticsError::InvalidBucketRange(format!("{} months reaches before the calendar", months)))?;

        Ok(Self {
            granularity: Granularity::Month,
            start: first.and_time(NaiveTime::MIN),
            count: months,
        })
    }

    /// Start of bucket `index`. `index == count` yields the end of the window.
    pub fn bucket_start(&self, index: u32) -> NaiveDateTime {
        match self.granularity {
            Granularity::Hour => self.start + Duration::hours(i64::from(index)),
            Granularity::Day => self.start + Duration::days(i64::from(index)),
            Granularity::Month => self
                .start
                .checked_add_months(Months::new(index))
                .unwrap_or(NaiveDateTime::MAX),
        }
    }

    pub fn window_end(&self) -> NaiveDateTime {
        self.bucket_start(self.count)
    }

    pub fn label(&self, start: NaiveDateTime) -> String {
        match self.granularity {
            Granularity::Hour => start.format("%H:00").to_string(),
            Granularity::Day => start.format("%Y-%m-%d").to_string(),
            Granularity::Month => start.format("%Y-%m").to_string(),
        }
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub scheduled: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    /// Unrecognized statuses are not counted anywhere, total included.
    pub fn record(&mut self, status: AppointmentStatus) {
        match status {
            AppointmentStatus::Scheduled => self.scheduled += 1,
            AppointmentStatus::InProgress => self.in_progress += 1,
            AppointmentStatus::Completed => self.completed += 1,
            AppointmentStatus::Cancelled => self.cancelled += 1,
            AppointmentStatus::Unrecognized => return,
        }
        self.total += 1;
    }

    pub fn from_appointments<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        let mut counts = Self::default();
        for apt in appointments {
            counts.record(apt.status);
        }
        counts
    }

    pub fn completion_rate(&self) -> f64 {
        rate(self.completed, self.total)
    }

    pub fn cancellation_rate(&self) -> f64 {
        rate(self.cancelled, self.total)
    }
}

/// `part / whole`, or 0 when there is nothing to divide by.
pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesReport {
    pub hourly: Vec<TimeBucket>,
    pub daily: Vec<TimeBucket>,
    pub monthly: Vec<TimeBucket>,
    pub invalid_records: usize,
}

// ==============================================================================
// CATEGORICAL BREAKDOWNS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorPerformance {
    pub doctor_id: RecordId,
    pub doctor_name: String,
    pub specialization: Option<String>,
    pub total_appointments: usize,
    pub completed_appointments: usize,
    pub completion_rate: f64,
    pub estimated_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "0-18")]
    Minor,
    #[serde(rename = "19-35")]
    YoungAdult,
    #[serde(rename = "36-50")]
    Adult,
    #[serde(rename = "51-65")]
    MiddleAged,
    #[serde(rename = "65+")]
    Senior,
}

impl AgeBand {
    pub const ALL: [AgeBand; 5] = [
        AgeBand::Minor,
        AgeBand::YoungAdult,
        AgeBand::Adult,
        AgeBand::MiddleAged,
        AgeBand::Senior,
    ];

    pub fn for_age(age: u32) -> Self {
        match age {
            0..=18 => AgeBand::Minor,
            19..=35 => AgeBand::YoungAdult,
            36..=50 => AgeBand::Adult,
            51..=65 => AgeBand::MiddleAged,
            _ => AgeBand::Senior,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Minor => "0-18",
            AgeBand::YoungAdult => "19-35",
            AgeBand::Adult => "36-50",
            AgeBand::MiddleAged => "51-65",
            AgeBand::Senior => "65+",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBandCount {
    pub band: AgeBand,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub total_patients: usize,
    /// Patients left out of the age bands for lack of a usable birth date.
    pub missing_birth_dates: usize,
    /// Always all five bands, youngest first.
    pub age_bands: Vec<AgeBandCount>,
    pub genders: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub completion_rate: f64,
    pub cancellation_rate: f64,
    pub total_revenue: f64,
    pub this_month_appointments: usize,
    pub last_month_appointments: usize,
    pub this_month_revenue: f64,
    pub average_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub overview: Overview,
    pub doctors: Vec<DoctorPerformance>,
    pub demographics: Demographics,
    pub invalid_records: usize,
}

// ==============================================================================
// PERIOD REPORTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportPeriod {
    Today,
    ThisWeek,
    ThisMonth,
    ThisYear,
}

impl ReportPeriod {
    /// Half-open `[start, end)` window containing `now`. Weeks start on Sunday.
    pub fn window(&self, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        let today = now.date();
        let (start, end) = match self {
            ReportPeriod::Today => (today, today + Duration::days(1)),
            ReportPeriod::ThisWeek => {
                let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
                (sunday, sunday + Duration::days(7))
            }
            ReportPeriod::ThisMonth => {
                let first = first_of_month(today);
                (first, first + Months::new(1))
            }
            ReportPeriod::ThisYear => {
                let first = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                (first, first + Months::new(12))
            }
        };
        (start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN))
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPeriod::Today => write!(f, "today"),
            ReportPeriod::ThisWeek => write!(f, "this-week"),
            ReportPeriod::ThisMonth => write!(f, "this-month"),
            ReportPeriod::ThisYear => write!(f, "this-year"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period: ReportPeriod,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub revenue: f64,
    pub completion_rate: f64,
    pub invalid_records: usize,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesRequest {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    pub daily_days: Option<u32>,
    #[serde(default)]
    pub now: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreakdownRequest {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub now: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub now: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Invalid bucket range: {0}")]
    InvalidBucketRange(String),
}

/// Why a record was left out of an aggregate. Reported through `invalid_records`
/// and logged, never returned to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("Appointment {appointment_id} has no usable scheduled time")]
    OutOfRangeDate { appointment_id: RecordId },

    #[error("Appointment {appointment_id} has an unrecognized status")]
    UnrecognizedStatus { appointment_id: RecordId },
}

impl InvalidRecord {
    pub fn check(appointment: &Appointment) -> Option<Self> {
        if !appointment.status.is_recognized() {
            return Some(InvalidRecord::UnrecognizedStatus {
                appointment_id: appointment.id.clone(),
            });
        }
        if appointment.scheduled_at.is_none() {
            return Some(InvalidRecord::OutOfRangeDate {
                appointment_id: appointment.id.clone(),
            });
        }
        None
    }
}
