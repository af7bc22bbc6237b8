//! Work-hours schedule

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use domain::Role;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{EditScheduleRequest, MonthScheduleResponse, ScheduleQuery, UpsertScheduleRequest},
    state::AppState,
};

pub async fn list_month(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<impl IntoResponse> {
    let (month, schedule) = state.schedule.list_month(query.year, query.month).await?;

    Ok(Json(MonthScheduleResponse {
        year: month.year(),
        month: month.month(),
        schedule,
    }))
}

/// Workers may only record their own hours
pub async fn upsert_hours(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<UpsertScheduleRequest>,
) -> ApiResult<impl IntoResponse> {
    if caller.role == Role::Worker && payload.user_id != caller.id {
        return Err(ApiError::Forbidden(
            "Workers can only record their own hours".to_string(),
        ));
    }

    let record = state
        .schedule
        .upsert_hours(payload.user_id, payload.work_date, payload.hours)
        .await?;
    Ok(Json(record))
}

pub async fn edit_hours(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<EditScheduleRequest>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Admin, Role::Manager])?;

    let record = state.schedule.edit_hours(payload.id, payload.hours).await?;
    Ok(Json(record))
}
