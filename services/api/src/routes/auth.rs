//! Login, identity and logout

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{LoginRequest, LoginResponse},
    state::AppState,
};

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let key = payload.login.trim().to_string();
    if key.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Login and password are required".to_string(),
        ));
    }
    if !state.login_limiter.is_allowed(&key).await {
        return Err(ApiError::TooManyRequests);
    }

    let Some(user) = state
        .directory
        .authenticate(&key, &payload.password)
        .await?
    else {
        state.login_limiter.record_failure(&key).await;
        return Err(ApiError::Unauthorized);
    };
    state.login_limiter.reset(&key).await;

    let (access_token, claims) = state.jwt.issue(&user).map_err(|e| {
        error!("Failed to issue access token: {}", e);
        ApiError::InternalServerError
    })?;

    info!("User {} ({}) logged in", user.login, user.role);
    Ok(Json(LoginResponse {
        success: true,
        user,
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: claims.remaining_lifetime(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .directory
        .find_user(caller.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(user))
}

/// Revoke the presented token for the rest of its lifetime
pub async fn logout(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    state
        .revocations
        .revoke(&caller.token_id, caller.remaining_lifetime())
        .await
        .map_err(|e| {
            error!("Failed to revoke token: {}", e);
            ApiError::InternalServerError
        })?;

    info!("User {} logged out", caller.login);
    Ok(Json(json!({ "success": true })))
}
