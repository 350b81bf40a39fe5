// libs/appointment-cell/src/services/calendar.rs
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::models::{Appointment, CalendarError, CalendarGrid, DayCell};

/// A displayed month. Navigation rolls over year boundaries.
/// Only constructed through [`MonthCursor::new`] or [`MonthCursor::containing`],
/// so `first_day` always exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        // The cursor must be able to step one month either way.
        let in_range = |y: Option<i32>, m: u32| y.and_then(|y| NaiveDate::from_ymd_opt(y, m, 1)).is_some();
        if !in_range(year.checked_sub(1), 12) || !in_range(year.checked_add(1), 1) {
            return Err(CalendarError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date` ("Today" in the month picker).
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next().first_day();
        next.signed_duration_since(self.first_day()).num_days() as u32
    }

    /// Weekday index of the 1st, Sunday = 0.
    pub fn leading_blanks(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

pub struct CalendarService;

impl CalendarService {
    pub fn new() -> Self {
        Self
    }

    /// Lay out `month` as rows of seven cells with the month's appointments
    /// attached to their calendar day.
    pub fn build_month_grid(
        &self,
        month: MonthCursor,
        today: NaiveDate,
        selected: Option<NaiveDate>,
        appointments: &[Appointment],
    ) -> CalendarGrid {
        let leading_blanks = month.leading_blanks();
        let days_in_month = month.days_in_month();

        let mut by_day = self.group_by_day(appointments, month);

        let mut cells: Vec<Option<DayCell>> = Vec::with_capacity((leading_blanks + days_in_month) as usize);
        cells.extend((0..leading_blanks).map(|_| None));

        for date in month.first_day().iter_days().take(days_in_month as usize) {
            cells.push(Some(DayCell {
                date,
                is_today: date == today,
                is_selected: selected == Some(date),
                is_current_month: month.contains(date),
                appointments: by_day.remove(&date).unwrap_or_default(),
            }));
        }

        let rows: Vec<Vec<Option<DayCell>>> = cells.chunks(7).map(|row| row.to_vec()).collect();

        debug!(
            "Built calendar grid for {}-{:02}: {} rows, {} leading blanks",
            month.year(),
            month.month(),
            rows.len(),
            leading_blanks
        );

        CalendarGrid {
            year: month.year(),
            month: month.month(),
            leading_blanks,
            days_in_month,
            rows,
        }
    }

    /// Appointments on one calendar day, earliest first.
    pub fn appointments_on(&self, date: NaiveDate, appointments: &[Appointment]) -> Vec<Appointment> {
        let mut matches: Vec<Appointment> = appointments
            .iter()
            .filter(|apt| apt.is_on(date))
            .cloned()
            .collect();
        matches.sort_by_key(|apt| apt.scheduled_at);
        matches
    }

    fn group_by_day(
        &self,
        appointments: &[Appointment],
        month: MonthCursor,
    ) -> BTreeMap<NaiveDate, Vec<Appointment>> {
        let mut by_day: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
        for apt in appointments {
            if let Some(date) = apt.scheduled_date().filter(|date| month.contains(*date)) {
                by_day.entry(date).or_default().push(apt.clone());
            }
        }
        for day in by_day.values_mut() {
            day.sort_by_key(|apt| apt.scheduled_at);
        }
        by_day
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}
