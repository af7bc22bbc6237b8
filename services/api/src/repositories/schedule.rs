//! Work-hours repository

use async_trait::async_trait;
use common::error::is_foreign_key_violation;
use domain::{DomainError, ScheduleEntry, ScheduleRecord, ScheduleUser, WorkHours, YearMonth};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{ScheduleStore, StoreResult};

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_record(&self, id: i64) -> StoreResult<ScheduleRecord> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.user_id, s.work_date, s.hours, u.full_name, u.login
            FROM schedule s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DomainError::not_found("schedule record", id))?;

        record_from_row(&row)
    }
}

fn record_from_row(row: &PgRow) -> StoreResult<ScheduleRecord> {
    let hours: f64 = row.get("hours");
    Ok(ScheduleRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        work_date: row.get("work_date"),
        hours: WorkHours::try_from(hours)?,
        full_name: row.get("full_name"),
        login: row.get("login"),
    })
}

#[async_trait]
impl ScheduleStore for ScheduleRepository {
    async fn month(&self, month: &YearMonth) -> StoreResult<Vec<ScheduleRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.user_id, s.work_date, s.hours, u.full_name, u.login
            FROM schedule s
            JOIN users u ON u.id = s.user_id
            WHERE s.work_date >= $1 AND s.work_date < $2
            ORDER BY s.work_date, u.full_name
            "#,
        )
        .bind(month.first_day())
        .bind(month.next_first_day())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn roster(&self) -> StoreResult<Vec<ScheduleUser>> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, login
            FROM users
            WHERE role IN ('worker', 'manager')
            ORDER BY full_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScheduleUser {
                id: row.get("id"),
                full_name: row.get("full_name"),
                login: row.get("login"),
            })
            .collect())
    }

    async fn upsert(&self, entry: &ScheduleEntry) -> StoreResult<ScheduleRecord> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO schedule (user_id, work_date, hours)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, work_date)
            DO UPDATE SET hours = EXCLUDED.hours, updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.work_date)
        .bind(entry.hours.as_f64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DomainError::not_found("user", entry.user_id).into()
            } else {
                super::StoreError::from(e)
            }
        })?;

        self.fetch_record(id).await
    }

    async fn update_hours(&self, id: i64, hours: WorkHours) -> StoreResult<ScheduleRecord> {
        let result = sqlx::query("UPDATE schedule SET hours = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(hours.as_f64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("schedule record", id).into());
        }
        self.fetch_record(id).await
    }
}
