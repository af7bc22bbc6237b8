//! User administration

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use domain::Role;
use serde_json::json;
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{CreateUserRequest, IdPayload, UsersQuery},
    state::AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<UsersQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Admin])?;
    if query.include_passwords == Some(true) {
        debug!("include_passwords requested; password hashes are never returned");
    }

    Ok(Json(state.directory.list_users().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Admin])?;

    let user = state
        .directory
        .create_user(
            &payload.login,
            &payload.password,
            &payload.role,
            &payload.full_name,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<IdPayload>,
) -> ApiResult<impl IntoResponse> {
    caller.require_any(&[Role::Admin])?;
    if payload.id == caller.id {
        return Err(ApiError::Forbidden(
            "You cannot delete your own account".to_string(),
        ));
    }

    state.directory.delete_user(payload.id).await?;
    Ok(Json(json!({ "success": true })))
}
