use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use domain::Role;
use serde_json::json;

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::{CreateSectionRequest, IdPayload},
    state::AppState,
};

pub async fn list_sections(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.directory.list_sections().await?))
}

pub async fn create_section(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<CreateSectionRequest>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Admin])?;

    let section = state
        .directory
        .create_section(&payload.name, &payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(section)))
}

pub async fn delete_section(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<IdPayload>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Admin])?;

    state.directory.delete_section(payload.id).await?;
    Ok(Json(json!({ "success": true })))
}
