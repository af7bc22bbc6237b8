//! Work-hours schedule
//!
//! One record per employee per day. Hours are kept as a count of half hours
//! so that comparison and summation stay exact.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Hours worked on one day: 0 to 24 in half-hour steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WorkHours(u8);

impl WorkHours {
    pub const MAX_HALF_HOURS: u8 = 48;

    pub fn from_half_hours(half_hours: u8) -> DomainResult<Self> {
        if half_hours > Self::MAX_HALF_HOURS {
            return Err(DomainError::validation("Hours must be between 0 and 24"));
        }
        Ok(Self(half_hours))
    }

    pub fn half_hours(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl TryFrom<f64> for WorkHours {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || !(0.0..=24.0).contains(&value) {
            return Err(DomainError::validation("Hours must be between 0 and 24"));
        }
        let halves = value * 2.0;
        if (halves - halves.round()).abs() > 1e-9 {
            return Err(DomainError::validation("Hours must be a multiple of 0.5"));
        }
        Self::from_half_hours(halves.round() as u8)
    }
}

impl From<WorkHours> for f64 {
    fn from(hours: WorkHours) -> Self {
        hours.as_f64()
    }
}

/// A calendar month with its date bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    month: u32,
    first_day: NaiveDate,
    next_first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        let (next_year, next_month) = if month == 12 {
            let next_year = year.checked_add(1).ok_or_else(|| {
                DomainError::validation(format!("Year {} is out of range", year))
            })?;
            (next_year, 1)
        } else {
            (year, month + 1)
        };
        let first_day = NaiveDate::from_ymd_opt(year, month, 1);
        let next_first_day = NaiveDate::from_ymd_opt(next_year, next_month, 1);

        match (first_day, next_first_day) {
            (Some(first_day), Some(next_first_day)) => Ok(Self {
                year,
                month,
                first_day,
                next_first_day,
            }),
            _ => Err(DomainError::validation(format!(
                "Year {} is out of range",
                year
            ))),
        }
    }

    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        let first_day = date.with_day(1).unwrap_or(date);
        let next_first_day = first_day
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self {
            year: date.year(),
            month: date.month(),
            first_day,
            next_first_day,
        }
    }

    /// Resolve optional query parameters, defaulting to the current month
    pub fn resolve(year: Option<i32>, month: Option<u32>) -> DomainResult<Self> {
        let current = Self::current();
        Self::new(
            year.unwrap_or(current.year),
            month.unwrap_or(current.month),
        )
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// First day of the following month (exclusive bound)
    pub fn next_first_day(&self) -> NaiveDate {
        self.next_first_day
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date < self.next_first_day
    }
}

/// Validated input for an upsert
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    pub user_id: i64,
    pub work_date: NaiveDate,
    pub hours: WorkHours,
}

impl ScheduleEntry {
    pub fn new(user_id: i64, work_date: NaiveDate, hours: f64) -> DomainResult<Self> {
        Ok(Self {
            user_id,
            work_date,
            hours: WorkHours::try_from(hours)?,
        })
    }
}

/// A stored day of work, with the user's name joined in at read time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: i64,
    pub user_id: i64,
    pub work_date: NaiveDate,
    pub hours: WorkHours,
    pub full_name: String,
    pub login: String,
}

/// Roster entry for the schedule grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleUser {
    pub id: i64,
    pub full_name: String,
    pub login: String,
}

/// One month of records together with the roster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthSchedule {
    pub schedule: Vec<ScheduleRecord>,
    pub users: Vec<ScheduleUser>,
}

impl MonthSchedule {
    pub fn hours_on(&self, user_id: i64, date: NaiveDate) -> Option<WorkHours> {
        self.schedule
            .iter()
            .find(|r| r.user_id == user_id && r.work_date == date)
            .map(|r| r.hours)
    }

    pub fn total_hours(&self, user_id: i64) -> f64 {
        let halves: u32 = self
            .schedule
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| u32::from(r.hours.half_hours()))
            .sum();
        f64::from(halves) / 2.0
    }

    /// Monthly total per roster entry, in roster order
    pub fn totals(&self) -> Vec<(i64, f64)> {
        self.users
            .iter()
            .map(|u| (u.id, self.total_hours(u.id)))
            .collect()
    }
}
