//! Work-hours schedule service

use std::sync::Arc;

use chrono::NaiveDate;
use domain::{MonthSchedule, ScheduleEntry, ScheduleRecord, WorkHours, YearMonth};
use tracing::info;

use super::log_failure;
use crate::repositories::{ScheduleStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Records and roster for a month; missing parts default to the current month
    pub async fn list_month(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> StoreResult<(YearMonth, MonthSchedule)> {
        let month = YearMonth::resolve(year, month).map_err(StoreError::from)?;

        let schedule = self
            .store
            .month(&month)
            .await
            .inspect_err(|e| log_failure("Schedule listing", e))?;
        let users = self
            .store
            .roster()
            .await
            .inspect_err(|e| log_failure("Roster listing", e))?;

        Ok((month, MonthSchedule { schedule, users }))
    }

    /// Create or overwrite the hours of one employee on one day
    pub async fn upsert_hours(
        &self,
        user_id: i64,
        work_date: NaiveDate,
        hours: f64,
    ) -> StoreResult<ScheduleRecord> {
        let entry = ScheduleEntry::new(user_id, work_date, hours)
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("Schedule update", e))?;

        let record = self
            .store
            .upsert(&entry)
            .await
            .inspect_err(|e| log_failure("Schedule update", e))?;

        info!(
            "Scheduled {} hours for user {} on {}",
            record.hours.as_f64(),
            record.user_id,
            record.work_date
        );
        Ok(record)
    }

    pub async fn edit_hours(&self, record_id: i64, hours: f64) -> StoreResult<ScheduleRecord> {
        let hours = WorkHours::try_from(hours)
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("Schedule edit", e))?;

        let record = self
            .store
            .update_hours(record_id, hours)
            .await
            .inspect_err(|e| log_failure("Schedule edit", e))?;

        info!(
            "Schedule record {} set to {} hours",
            record.id,
            record.hours.as_f64()
        );
        Ok(record)
    }
}
